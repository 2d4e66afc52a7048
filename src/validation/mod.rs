/*!
 * Validation module for caption timelines.
 *
 * - `timecodes`: checks durations, reading speed, ordering and numbering
 *   of a synchronized or parsed timeline
 */

pub mod timecodes;

// Re-export main types
pub use timecodes::{TimelineIssue, TimelineValidationResult, TimelineValidator, TimelineValidatorConfig};
