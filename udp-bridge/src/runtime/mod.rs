pub(crate) mod worker_runtime;
