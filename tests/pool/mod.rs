//! Fixtures, step definitions, and scenarios for pool behaviour.

mod bdd_steps;
mod scenarios;
mod test_helpers;
