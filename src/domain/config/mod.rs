mod merge;

pub use merge::{compose, environment_layer, merge, ENVIRONMENT_PLUGIN};
