pub(crate) mod clock;
pub(crate) mod countdown;
pub(crate) mod manager;
pub(crate) mod store;
