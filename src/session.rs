//! Line-oriented driver for a [`VideoWall`].
//!
//! Stands in for a graphical front end: each input line is one UI event
//! (paste a URL, click a slot, drag one slot onto another, toggle mute).
//! Slots are numbered from 1 for people and from 0 internally.

use std::io::{BufRead, Write};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::classify::classify;
use crate::error::{Result, TwillError};
use crate::wall::VideoWall;

const HELP: &str = "\
Commands:
  add <url>        place a YouTube, Twitch or Kick URL in the first free slot
  clear <slot>     empty a slot
  swap <a> <b>     exchange two slots
  select <slot>    make a slot audible, or silence it if it already is
  audio <slot>     make a slot audible ('audio none' mutes everything)
  mute             toggle mute-all
  show             print the wall
  help             print this help
  quit             leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Add(String),
    Clear(usize),
    Swap(usize, usize),
    Select(usize),
    Audio(Option<usize>),
    MuteAll,
    Show,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = TwillError;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = parts.collect();

        let command = match (verb.as_str(), args.as_slice()) {
            ("add", [url]) => SessionCommand::Add(url.to_string()),
            ("clear", [slot]) => SessionCommand::Clear(parse_slot(slot)?),
            ("swap", [a, b]) => SessionCommand::Swap(parse_slot(a)?, parse_slot(b)?),
            ("select", [slot]) => SessionCommand::Select(parse_slot(slot)?),
            ("audio", ["none"]) => SessionCommand::Audio(None),
            ("audio", [slot]) => SessionCommand::Audio(Some(parse_slot(slot)?)),
            ("mute", []) => SessionCommand::MuteAll,
            ("show", []) => SessionCommand::Show,
            ("help", []) => SessionCommand::Help,
            ("quit" | "exit", []) => SessionCommand::Quit,
            _ => {
                return Err(TwillError::Config(format!(
                    "Unrecognized command '{}' (try 'help')",
                    line.trim()
                )));
            }
        };
        Ok(command)
    }
}

/// Parse a 1-based slot number into a slot id
fn parse_slot(text: &str) -> Result<usize> {
    match text.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(TwillError::Config(format!(
            "'{}' is not a slot number (slots start at 1)",
            text
        ))),
    }
}

/// Click-to-toggle audio selection.
///
/// Clicking the audible slot silences it, clicking another occupied slot
/// selects it, and clicking an empty slot does nothing. The toggle lives
/// here rather than in [`VideoWall`] so the wall's setter stays a setter.
pub fn toggle_audio_selection(wall: &mut VideoWall, slot_id: usize) -> Result<()> {
    if wall.slot(slot_id)?.is_empty() {
        debug!("Ignoring audio selection of empty slot {}", slot_id);
        return Ok(());
    }

    if wall.audio().active_slot == Some(slot_id) {
        wall.set_active_audio_slot(None)
    } else {
        wall.set_active_audio_slot(Some(slot_id))
    }
}

/// Text rendering of the wall, one line per slot
pub fn render(wall: &VideoWall) -> String {
    let audio = wall.audio();
    let mut out = String::new();

    for slot in wall.slots() {
        let marker = if wall.is_audible(slot.id) { "🔊" } else { "  " };
        let content = match &slot.video {
            Some(video) if video.is_live => {
                format!("{:<8} {} (live)", video.platform.display_name(), video.video_id)
            }
            Some(video) => format!("{:<8} {}", video.platform.display_name(), video.video_id),
            None => "(empty)".to_string(),
        };
        out.push_str(&format!("{} [{}] {}\n", marker, slot.id + 1, content));
    }

    let status = match (audio.mute_all, audio.active_slot) {
        (true, _) => "audio: muted".to_string(),
        (false, Some(id)) => format!("audio: slot {}", id + 1),
        (false, None) => "audio: unmuted, no slot selected".to_string(),
    };
    out.push_str(&status);
    out.push('\n');
    out
}

/// What a command did, for echoing back to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Message(String),
    Quit,
}

pub struct Session {
    wall: VideoWall,
}

impl Session {
    pub fn new(wall: VideoWall) -> Self {
        Self { wall }
    }

    pub fn wall(&self) -> &VideoWall {
        &self.wall
    }

    pub fn execute(&mut self, command: SessionCommand) -> Result<Outcome> {
        let message = match command {
            SessionCommand::Add(url) => {
                let video = classify(&url)?;
                let slot = self.wall.add_parsed(&video)?;
                let kind = if video.is_live { "live" } else { "video" };
                format!(
                    "Added {} {} {} to slot {}",
                    video.platform,
                    kind,
                    video.video_id,
                    slot + 1
                )
            }
            SessionCommand::Clear(slot) => {
                self.wall.clear(slot)?;
                format!("Cleared slot {}", slot + 1)
            }
            SessionCommand::Swap(a, b) => {
                self.wall.swap(a, b)?;
                format!("Swapped slots {} and {}", a + 1, b + 1)
            }
            SessionCommand::Select(slot) => {
                toggle_audio_selection(&mut self.wall, slot)?;
                render(&self.wall)
            }
            SessionCommand::Audio(slot) => {
                self.wall.set_active_audio_slot(slot)?;
                render(&self.wall)
            }
            SessionCommand::MuteAll => {
                if self.wall.toggle_mute_all() {
                    "Muted all slots".to_string()
                } else {
                    "Unmuted".to_string()
                }
            }
            SessionCommand::Show => render(&self.wall),
            SessionCommand::Help => HELP.to_string(),
            SessionCommand::Quit => return Ok(Outcome::Quit),
        };
        Ok(Outcome::Message(message))
    }

    /// Read commands line by line until EOF or `quit`.
    ///
    /// Rejected commands are reported and the session carries on.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        writeln!(output, "{}", render(&self.wall))?;

        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let result = line
                .parse::<SessionCommand>()
                .and_then(|command| self.execute(command));

            match result {
                Ok(Outcome::Quit) => break,
                Ok(Outcome::Message(message)) => writeln!(output, "{}", message.trim_end())?,
                Err(e) => {
                    warn!("Rejected '{}': {}", line.trim(), e);
                    writeln!(output, "error: {}", e)?;
                }
            }
        }

        output.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Platform;
    use crate::wall::Layout;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "add https://kick.com/x".parse::<SessionCommand>().unwrap(),
            SessionCommand::Add("https://kick.com/x".to_string())
        );
        assert_eq!("clear 1".parse::<SessionCommand>().unwrap(), SessionCommand::Clear(0));
        assert_eq!("SWAP 1 4".parse::<SessionCommand>().unwrap(), SessionCommand::Swap(0, 3));
        assert_eq!("audio none".parse::<SessionCommand>().unwrap(), SessionCommand::Audio(None));
        assert_eq!("audio 2".parse::<SessionCommand>().unwrap(), SessionCommand::Audio(Some(1)));
        assert_eq!("exit".parse::<SessionCommand>().unwrap(), SessionCommand::Quit);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("clear 0".parse::<SessionCommand>().is_err());
        assert!("clear one".parse::<SessionCommand>().is_err());
        assert!("swap 1".parse::<SessionCommand>().is_err());
        assert!("dance".parse::<SessionCommand>().is_err());
    }

    #[test]
    fn test_toggle_audio_selection() {
        let mut wall = VideoWall::new(Layout::Quad);
        wall.add(Platform::Twitch, "chan").unwrap();

        toggle_audio_selection(&mut wall, 0).unwrap();
        assert_eq!(wall.audio().active_slot, Some(0));
        assert!(!wall.audio().mute_all);

        toggle_audio_selection(&mut wall, 0).unwrap();
        assert_eq!(wall.audio().active_slot, None);
        assert!(wall.audio().mute_all);

        // empty slot: ignored
        toggle_audio_selection(&mut wall, 2).unwrap();
        assert_eq!(wall.audio().active_slot, None);

        assert!(toggle_audio_selection(&mut wall, 9).is_err());
    }

    #[test]
    fn test_render() {
        let mut wall = VideoWall::new(Layout::Quad);
        wall.add(Platform::YouTube, "abc123").unwrap();
        wall.add(Platform::Twitch, "chan").unwrap();
        wall.set_active_audio_slot(Some(0)).unwrap();

        let text = render(&wall);
        assert!(text.contains("🔊 [1] YouTube  abc123"));
        assert!(text.contains("[2] Twitch   chan (live)"));
        assert!(text.contains("[4] (empty)"));
        assert!(text.ends_with("audio: slot 1\n"));
    }

    #[test]
    fn test_run_script() {
        let script = "\
add https://www.youtube.com/watch?v=abc123
add https://www.twitch.tv/somechannel
add https://example.com/
select 2
swap 1 2
clear 2
quit
add https://kick.com/ignored
";
        let mut session = Session::new(VideoWall::new(Layout::Quad));
        let mut output = Vec::new();
        session.run(script.as_bytes(), &mut output).unwrap();

        let wall = session.wall();
        assert_eq!(wall.occupied(), 1);
        assert_eq!(wall.slot(0).unwrap().video.as_ref().unwrap().video_id, "somechannel");
        // audio stayed on slot 2, which was then cleared
        assert_eq!(wall.audio().active_slot, None);
        assert!(!wall.audio().mute_all);

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Added YouTube video abc123 to slot 1"));
        assert!(output.contains("Added Twitch live somechannel to slot 2"));
        assert!(output.contains("error: Invalid video URL"));
        assert!(!output.contains("ignored"));
    }

    #[test]
    fn test_full_wall_is_reported() {
        let mut session = Session::new(VideoWall::new(Layout::Quad));
        for n in 0..4 {
            session
                .execute(SessionCommand::Add(format!("https://kick.com/s{}", n)))
                .unwrap();
        }
        let err = session
            .execute(SessionCommand::Add("https://kick.com/late".to_string()))
            .unwrap_err();
        assert!(matches!(err, TwillError::CapacityExhausted { capacity: 4 }));
    }
}
