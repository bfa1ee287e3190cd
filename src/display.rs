use std::fs::File;
use std::io::Write;
use crate::matching::Draft;
use crate::roster::Participant;

/// Formats a participant with their team label and new-hire marker.
pub fn format_participant(participant: &Participant) -> String {
    if participant.is_new_hire {
        format!("{} [{}] *new hire*", participant.name, participant.team)
    } else {
        format!("{} [{}]", participant.name, participant.team)
    }
}

/// Prints a draft in a readable per-group layout.
pub fn print_draft(draft: &Draft, date_label: &str) {
    println!("\n=== Matching Result ({}) ===", date_label);
    println!("Groups: {}", draft.len());

    for (index, group) in draft.iter().enumerate() {
        let marker = if group.is_buddy_group() { " (buddy group)" } else { "" };
        println!("\nGroup {}{}", index + 1, marker);
        for member in &group.members {
            println!("  - {}", format_participant(member));
        }
    }
}

/// Writes a draft to a file, one group per block.
pub fn write_draft_to_file(
    draft: &Draft,
    date_label: &str,
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(filename)?;

    writeln!(file, "** {} **", date_label)?;
    for (index, group) in draft.iter().enumerate() {
        let marker = if group.is_buddy_group() { " (buddy group)" } else { "" };
        writeln!(file)?;
        writeln!(file, "Group {}{}", index + 1, marker)?;
        for member in &group.members {
            writeln!(file, "{}", format_participant(member))?;
        }
    }

    Ok(())
}
