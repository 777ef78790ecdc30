//! Interactive package selection with inquire.

use inquire::{InquireError, Select};

use catalyst::core::AbstractDependency;
use catalyst::resolver::{CandidatePicker, ResolveError, SearchResult};

const SKIP: &str = "Skip (leave unresolved)";

/// Asks on the terminal which search result to use.
pub struct PromptPicker;

impl CandidatePicker for PromptPicker {
    fn pick(
        &self,
        dep: &AbstractDependency,
        candidates: &[SearchResult],
    ) -> Result<Option<usize>, ResolveError> {
        let mut options: Vec<String> = candidates
            .iter()
            .map(|c| {
                if c.description.is_empty() {
                    format!("{} ({}%)", c.package_name, c.confidence)
                } else {
                    format!("{} ({}%) - {}", c.package_name, c.confidence, c.description)
                }
            })
            .collect();
        options.push(SKIP.to_string());

        let answer = Select::new(&format!("Package for `{}`:", dep), options)
            .with_help_message("↑↓ to move, enter to select, esc to skip")
            .raw_prompt();

        match answer {
            Ok(choice) if choice.index < candidates.len() => Ok(Some(choice.index)),
            Ok(_) => Ok(None),
            Err(InquireError::OperationCanceled) => Ok(None),
            Err(e) => Err(ResolveError::Prompt {
                dependency: dep.to_string(),
                message: e.to_string(),
            }),
        }
    }
}
