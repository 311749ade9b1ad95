//! Terminal story reader.
//!
//! Reads commands line by line: a choice number advances, `r` restarts, `q` quits. End of
//! input also quits. Choices whose target does not resolve are shown but cannot be picked.

use std::io::{self, BufRead, Write};
use storyforge_core::{AdvanceOutcome, PlaybackStatus, Story, Traversal};

/// Runs an interactive reading session and returns the final playback state.
pub fn run_session<R: BufRead, W: Write>(
    story: &Story,
    mut input: R,
    mut out: W,
) -> io::Result<Traversal> {
    let nodes = &story.nodes;
    let mut play = Traversal::initialize(nodes);
    writeln!(out, "== {} ==", story.title)?;

    if play.status(nodes) == PlaybackStatus::NoStart {
        writeln!(out, "This story has no start scene.")?;
        return Ok(play);
    }

    let mut line = String::new();
    loop {
        render(&play, story, &mut out)?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        match line.trim() {
            "q" | "quit" => break,
            "r" | "restart" => {
                play.restart(nodes);
                writeln!(out, "-- restarted --")?;
            }
            other => {
                let Some(index) = other.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) else {
                    writeln!(out, "Enter a choice number, r or q.")?;
                    continue;
                };
                let offered = play.offered_choices(nodes);
                let Some(choice_id) = offered.get(index).map(|o| o.choice.id.clone()) else {
                    writeln!(out, "No such choice.")?;
                    continue;
                };
                match play.advance(nodes, &choice_id) {
                    AdvanceOutcome::Advanced => {}
                    AdvanceOutcome::UnresolvedTarget => {
                        writeln!(out, "That choice does not lead anywhere yet.")?;
                    }
                    AdvanceOutcome::ChoiceNotOffered | AdvanceOutcome::NoCurrentScene => {
                        writeln!(out, "No such choice.")?;
                    }
                }
            }
        }
    }

    writeln!(out, "Scenes visited: {}", play.journey_len())?;
    Ok(play)
}

fn render<W: Write>(play: &Traversal, story: &Story, out: &mut W) -> io::Result<()> {
    let nodes = &story.nodes;
    let Some(scene) = play.current_node(nodes) else {
        return writeln!(out, "The current scene no longer exists. Enter r to restart.");
    };

    writeln!(out)?;
    writeln!(out, "# {}", scene.title)?;
    writeln!(out, "{}", scene.content)?;

    match play.status(nodes) {
        PlaybackStatus::Ended => writeln!(out, "The End. (r to restart, q to quit)"),
        PlaybackStatus::DeadEnd => {
            writeln!(out, "This path has no choices yet. (r to restart, q to quit)")
        }
        PlaybackStatus::NoStart => Ok(()),
        PlaybackStatus::Reading => {
            for (i, offered) in play.offered_choices(nodes).iter().enumerate() {
                let marker = if offered.resolves { "" } else { " (unfinished)" };
                writeln!(out, "  {}. {}{}", i + 1, offered.choice.text, marker)?;
            }
            write!(out, "> ")?;
            out.flush()
        }
    }
}
