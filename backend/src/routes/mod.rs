pub(crate) mod goals;
pub(crate) mod health;
pub(crate) mod history;
pub(crate) mod market;
pub(crate) mod optimization;
pub(crate) mod portfolios;
