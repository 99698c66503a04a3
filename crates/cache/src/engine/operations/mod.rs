//! Cache operations

mod commit;
mod edit;
mod get;
mod misc;
mod remove;
