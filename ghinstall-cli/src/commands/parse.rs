//! Parse command - show how a reference is understood.

use console::style;
use ghinstall::reference::{Reference, RevisionSelector};

use crate::error::CliError;

/// Run the parse command.
pub fn run(input: &str, json: bool) -> Result<(), CliError> {
    let reference = Reference::parse(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reference)?);
        return Ok(());
    }

    for (label, value) in describe(&reference) {
        println!("{:<10} {}", style(label).bold(), value);
    }
    Ok(())
}

/// Labelled fields of a reference, in display order.
fn describe(reference: &Reference) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("owner", reference.owner.clone()),
        ("name", reference.name.clone()),
    ];
    match &reference.selector {
        Some(RevisionSelector::Branch(branch)) => fields.push(("branch", branch.clone())),
        Some(RevisionSelector::Revision(rev)) => fields.push(("revision", rev.clone())),
        Some(RevisionSelector::PullRequest(pr)) => fields.push(("pull", pr.to_string())),
        None => fields.push(("branch", "(default)".to_string())),
    }
    if let Some(subdir) = &reference.subdir {
        fields.push(("subdir", subdir.clone()));
    }
    fields.push(("url", reference.clone_url()));
    fields
}
