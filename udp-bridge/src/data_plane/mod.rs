pub(crate) mod ingress_loop;
