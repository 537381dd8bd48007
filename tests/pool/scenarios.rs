//! BDD scenarios for listing and growing an OVHcloud pool.

use rstest_bdd_macros::scenario;

use super::test_helpers::{PoolContext, pool_context};

#[scenario(
    path = "tests/features/ovhcloud_pool.feature",
    name = "List only the live instances of a pool"
)]
fn scenario_list_live_instances(pool_context: PoolContext) {
    let _ = pool_context;
}

#[scenario(
    path = "tests/features/ovhcloud_pool.feature",
    name = "Refuse creations beyond the running-instance cap"
)]
fn scenario_refuse_over_capacity(pool_context: PoolContext) {
    let _ = pool_context;
}
