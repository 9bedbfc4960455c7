//! Headless frontends and the frame loop that drives a playback session.

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::{Duration, Instant};

use simview_core::{EventSource, Frame, FrameInput, PlaybackSession};
use tracing::debug;

/// One frame's worth of user input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Step(FrameInput),
    Goto(u64),
    Quit,
}

/// Parses one input line. Empty means no key held this frame.
pub fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let command = match words.next() {
        None => Command::Step(FrameInput::IDLE),
        Some("f" | "right") => Command::Step(FrameInput::FORWARD),
        Some("b" | "left") => Command::Step(FrameInput::BACKWARD),
        Some("fb" | "bf") => Command::Step(FrameInput {
            forward: true,
            backward: true,
        }),
        Some("g" | "goto") => Command::Goto(words.next()?.parse().ok()?),
        Some("q" | "quit") => Command::Quit,
        Some(_) => return None,
    };
    Some(command)
}

/// Where frame input comes from and where frames go.
pub trait Frontend {
    fn poll(&mut self) -> io::Result<Command>;
    fn draw(&mut self, frame: &Frame) -> io::Result<()>;
}

/// Prints a frame the way the viewer lays it out: counter first, event below.
fn write_frame<W: Write>(out: &mut W, frame: &Frame) -> io::Result<()> {
    writeln!(out, "{}", frame.tick_label())?;
    if let Some(label) = frame.event_label() {
        writeln!(out, "{}", label)?;
    }
    Ok(())
}

/// Reads one command per line; end of input quits.
pub struct LineFrontend<R, W> {
    input: R,
    output: W,
    line: String,
}

impl<R: BufRead, W: Write> LineFrontend<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            line: String::new(),
        }
    }
}

impl<R: BufRead, W: Write> Frontend for LineFrontend<R, W> {
    fn poll(&mut self) -> io::Result<Command> {
        loop {
            self.line.clear();
            if self.input.read_line(&mut self.line)? == 0 {
                return Ok(Command::Quit);
            }
            match parse_command(&self.line) {
                Some(command) => return Ok(command),
                None => writeln!(
                    self.output,
                    "unknown input {:?} (f, b, fb, goto N, q)",
                    self.line.trim()
                )?,
            }
        }
    }

    fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        write_frame(&mut self.output, frame)?;
        self.output.flush()
    }
}

/// Shows the first tick once, then holds "forward" every frame.
pub struct AutoplayFrontend<W> {
    output: W,
    started: bool,
}

impl<W: Write> AutoplayFrontend<W> {
    pub fn new(output: W) -> Self {
        Self {
            output,
            started: false,
        }
    }
}

impl<W: Write> Frontend for AutoplayFrontend<W> {
    fn poll(&mut self) -> io::Result<Command> {
        if !self.started {
            self.started = true;
            return Ok(Command::Step(FrameInput::IDLE));
        }
        Ok(Command::Step(FrameInput::FORWARD))
    }

    fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        write_frame(&mut self.output, frame)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LoopOptions {
    /// Sleep out the rest of each frame's budget.
    pub frame_budget: Option<Duration>,
    pub max_frames: Option<u64>,
    /// Stop once nothing further can appear going forward.
    pub stop_past_end: bool,
}

/// Runs frames until the frontend quits or a limit is hit. Returns the number
/// of frames drawn.
pub fn run_frames<S, F>(
    session: &mut PlaybackSession<S>,
    frontend: &mut F,
    options: LoopOptions,
) -> anyhow::Result<u64>
where
    S: EventSource,
    F: Frontend,
{
    let mut frames = 0u64;

    while options.max_frames.map_or(true, |max| frames < max) {
        let started = Instant::now();

        let frame = match frontend.poll()? {
            Command::Quit => break,
            Command::Step(input) => session.frame(input)?,
            Command::Goto(tick) => session.seek(tick)?,
        };
        frontend.draw(&frame)?;
        frames += 1;

        if options.stop_past_end && session.is_past_end() {
            debug!(tick = frame.tick, "Reached end of event log");
            break;
        }

        if let Some(budget) = options.frame_budget {
            if let Some(rest) = budget.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }
    }

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use simview_core::{Action, Event, IterSource};

    fn session() -> PlaybackSession<IterSource<std::vec::IntoIter<Event>>> {
        let event = |tick, action| Event {
            tick,
            action,
            file_id: 1,
            size: 1024.0,
            num_requests: 1,
            delta_t: 0,
            occupancy: None,
        };
        PlaybackSession::new(IterSource::new(vec![
            event(0, Action::Add),
            event(3, Action::Delete),
        ]))
    }

    #[test]
    fn parses_inputs() {
        assert_eq!(parse_command("\n"), Some(Command::Step(FrameInput::IDLE)));
        assert_eq!(parse_command("f\n"), Some(Command::Step(FrameInput::FORWARD)));
        assert_eq!(parse_command("left"), Some(Command::Step(FrameInput::BACKWARD)));
        assert_eq!(parse_command("goto 12"), Some(Command::Goto(12)));
        assert_eq!(parse_command("q"), Some(Command::Quit));
        assert_eq!(parse_command("goto"), None);
        assert_eq!(parse_command("goto -1"), None);
        assert_eq!(parse_command("jump"), None);
    }

    #[test]
    fn line_frontend_scrubs_and_prints() {
        let input = Cursor::new("\nf\nf\nf\nb\nq\n");
        let mut output = Vec::new();
        let mut frontend = LineFrontend::new(input, &mut output);
        let mut session = session();

        let frames = run_frames(&mut session, &mut frontend, LoopOptions::default()).unwrap();
        assert_eq!(frames, 5);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Tick: 0\nADD -> 1\nTick: 1\nTick: 2\nTick: 3\nDELETE -> 1\nTick: 2\n"
        );
    }

    #[test]
    fn unknown_lines_are_reported_and_skipped() {
        let input = Cursor::new("jump\ngoto 3\n");
        let mut output = Vec::new();
        let mut frontend = LineFrontend::new(input, &mut output);

        let frames = run_frames(&mut session(), &mut frontend, LoopOptions::default()).unwrap();
        assert_eq!(frames, 1);
        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with("unknown input \"jump\""));
        assert!(text.ends_with("Tick: 3\nDELETE -> 1\n"));
    }

    #[test]
    fn autoplay_stops_past_the_last_event() {
        let mut output = Vec::new();
        let mut frontend = AutoplayFrontend::new(&mut output);
        let options = LoopOptions {
            stop_past_end: true,
            ..LoopOptions::default()
        };

        let frames = run_frames(&mut session(), &mut frontend, options).unwrap();
        assert_eq!(frames, 5);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Tick: 0\nADD -> 1\nTick: 1\nTick: 2\nTick: 3\nDELETE -> 1\nTick: 4\n"
        );
    }

    #[test]
    fn frame_limit_is_respected() {
        let mut output = Vec::new();
        let mut frontend = AutoplayFrontend::new(&mut output);
        let options = LoopOptions {
            max_frames: Some(2),
            ..LoopOptions::default()
        };
        assert_eq!(run_frames(&mut session(), &mut frontend, options).unwrap(), 2);
    }
}
