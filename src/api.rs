pub(crate) mod auth;
pub(crate) mod content;
pub(crate) mod delivery;
pub(crate) mod errors;
pub(crate) mod examinees;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod mocks;
pub(crate) mod pagination;
pub(crate) mod results;
pub(crate) mod router;
pub(crate) mod scores;
pub(crate) mod validation;
