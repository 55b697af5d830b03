//! Image change trigger mutator

use super::{Mutator, MutatorError};
use resources::WorkloadObject;

/// Converges the image change trigger list toward the desired triggers.
///
/// Triggers are matched by image stream base name (the part of `from.name`
/// before the tag): a matching existing trigger is rewritten when its tag,
/// automatic flag, container list, or import policy differ; a missing trigger
/// is appended. Triggers for streams the desired object does not mention are
/// left alone, they belong to other actors.
#[derive(Debug, Clone, Copy)]
pub struct ImageTriggerMutator;

fn stream_base(from_name: &str) -> &str {
    from_name.split(':').next().unwrap_or(from_name)
}

impl Mutator for ImageTriggerMutator {
    fn name(&self) -> &'static str {
        "image-trigger"
    }

    fn ownership(&self) -> &'static [&'static str] {
        &["triggers"]
    }

    fn mutate(
        &self,
        desired: &WorkloadObject,
        existing: &mut WorkloadObject,
    ) -> Result<bool, MutatorError> {
        let mut changed = false;

        for desired_trigger in &desired.triggers {
            let base = stream_base(&desired_trigger.from.name);

            let mut matches = existing
                .triggers
                .iter_mut()
                .filter(|t| stream_base(&t.from.name) == base);

            match (matches.next(), matches.next()) {
                (Some(_), Some(_)) => {
                    return Err(MutatorError {
                        mutator: self.name(),
                        path: "triggers".to_string(),
                        reason: format!(
                            "multiple triggers reference image stream '{base}', cannot pick one to update"
                        ),
                    });
                }
                (Some(current), None) => {
                    if current != desired_trigger {
                        *current = desired_trigger.clone();
                        changed = true;
                    }
                }
                (None, _) => {
                    existing.triggers.push(desired_trigger.clone());
                    changed = true;
                }
            }
        }

        Ok(changed)
    }
}
