pub(crate) mod edit;
pub(crate) mod exchange;
pub(crate) mod model;
pub(crate) mod validate;
