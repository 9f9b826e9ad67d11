pub(crate) mod admins;
pub(crate) mod band_scores;
pub(crate) mod examinees;
pub(crate) mod health;
pub(crate) mod listening;
pub(crate) mod mocks;
pub(crate) mod question_tables;
pub(crate) mod reading;
pub(crate) mod speaking;
pub(crate) mod test_results;
pub(crate) mod writing;
