pub mod stage1_outcomes;
pub mod stage2_discrimination;
pub mod stage3_tertiles;
pub mod stage4_report;

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/fixtures.rs"]
pub(crate) mod fixtures;
