pub(crate) mod banding;
pub(crate) mod content;
pub(crate) mod mock_activation;
pub(crate) mod results;
