// src/timer.rs
//
// Full-screen darkroom countdown: optional delay, initial agitation, then
// develop/agitate cycles until the total runs out. Red screen = hands on the
// tank, green = leave it alone. Runs until ten seconds past done, or q /
// Esc / Ctrl-C.

use std::{
    io::{self, Write},
    time::{Duration, Instant},
};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub total: Duration,
    pub initial: Duration,
    pub agitation: Duration,
    pub interval: Duration,
    pub delay: Duration,
}

impl Plan {
    pub fn validate(&self) -> Result<(), String> {
        if !self.agitation.is_zero() && self.interval <= self.agitation {
            return Err(
                "agitation interval must be longer than the agitation itself".to_string()
            );
        }
        Ok(())
    }

    /// An agitation of zero disables the cycle entirely.
    fn cycle(&self) -> Duration {
        if self.agitation.is_zero() {
            Duration::ZERO
        } else {
            self.interval
        }
    }
}

/// Parse the loose duration forms the command line accepts: "7m30s",
/// "1:30" (minutes:seconds), "45s", bare "45".
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let s = raw.replacen(':', "m", 1);
    let s = if s.ends_with(['s', 'm']) { s } else { format!("{s}s") };

    let (mins, secs) = match s.split_once('m') {
        Some((m, rest)) => {
            let rest = rest.strip_suffix('s').unwrap_or(rest);
            let secs = if rest.is_empty() { 0 } else { rest.parse().ok()? };
            (m.parse::<u64>().ok()?, secs)
        }
        None => (0, s.strip_suffix('s')?.parse::<u64>().ok()?),
    };
    if secs >= 60 && mins > 0 {
        return None;
    }
    Some(Duration::from_secs(mins * 60 + secs))
}

// Holds rendered text so frame comparison happens at display resolution:
// the clock shows tenths, so the screen repaints at most ten times a second.
#[derive(Clone, PartialEq)]
struct Frame {
    label: &'static str,
    remaining: String,
    left: String,
    busy: bool, // busy = agitating = red
}

impl Frame {
    fn new(label: &'static str, remaining: Duration, left: Option<Duration>, busy: bool) -> Self {
        Frame {
            label,
            remaining: fmt_clock(remaining),
            left: left.map(fmt_clock).unwrap_or_default(),
            busy,
        }
    }
}

pub fn run(plan: &Plan) -> io::Result<()> {
    plan.validate().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let mut out = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(out, terminal::EnterAlternateScreen, cursor::Hide)?;
    let result = tick_loop(plan, &mut out);
    execute!(out, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn tick_loop(plan: &Plan, out: &mut io::Stdout) -> io::Result<()> {
    let start = Instant::now();
    let cycle = plan.cycle().as_secs_f64();
    let mut last: Option<(Frame, (u16, u16))> = None;

    loop {
        if quit_requested()? {
            return Ok(());
        }

        let since = start.elapsed().as_secs_f64() - plan.delay.as_secs_f64();
        let left = plan.total.as_secs_f64() - since;

        if left <= -10.0 {
            return Ok(());
        }

        let frame = current_frame(plan, since, left, cycle);
        let size = terminal::size()?;
        let changed = match &last {
            Some((f, s)) => *f != frame || *s != size,
            None => true,
        };
        if changed {
            draw(out, &frame, size)?;
            last = Some((frame, size));
        }
    }
}

fn current_frame(plan: &Plan, since: f64, left: f64, cycle: f64) -> Frame {
    let initial = plan.initial.as_secs_f64();
    let agitation = plan.agitation.as_secs_f64();

    if left <= 0.0 {
        // Blink between the two palettes to be visible across the room.
        let blink = (since * 5.0) as i64 % 2 == 0;
        return Frame::new("Done", Duration::ZERO, None, blink);
    }
    if since < 0.0 {
        return Frame::new("wait", Duration::from_secs_f64(-since), None, false);
    }

    let left_dur = Duration::from_secs_f64(left);
    if since < initial {
        let rem = (initial - since).min(left);
        return Frame::new("AGITATE!", Duration::from_secs_f64(rem), Some(left_dur), true);
    }

    // Past the initial phase: position within the develop/agitate cycle.
    if cycle <= 0.0 {
        return Frame::new("Developing", left_dur, Some(left_dur), false);
    }
    let in_cycle = (since - initial) % cycle;
    let develop_span = cycle - agitation;
    if in_cycle < develop_span {
        let rem = (develop_span - in_cycle).min(left);
        Frame::new("Developing", Duration::from_secs_f64(rem), Some(left_dur), false)
    } else {
        let rem = (cycle - in_cycle).min(left);
        Frame::new("AGITATE!", Duration::from_secs_f64(rem), Some(left_dur), true)
    }
}

fn quit_requested() -> io::Result<bool> {
    while event::poll(Duration::from_millis(10))? {
        if let Event::Key(key) = event::read()? {
            let ctrl_c =
                key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
            if ctrl_c || matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn fmt_clock(d: Duration) -> String {
    let tenths = d.as_millis() / 100;
    format!("{:02}:{:02}.{}", tenths / 600, (tenths / 10) % 60, tenths % 10)
}

fn draw(out: &mut io::Stdout, frame: &Frame, (cols, rows): (u16, u16)) -> io::Result<()> {
    let bg = if frame.busy { Color::AnsiValue(88) } else { Color::AnsiValue(22) };
    queue!(
        out,
        SetBackgroundColor(bg),
        SetForegroundColor(Color::AnsiValue(255)),
        terminal::Clear(terminal::ClearType::All),
    )?;

    let lines = [
        frame.label,
        "",
        frame.remaining.as_str(),
        "",
        frame.left.as_str(),
    ];
    let top = rows.saturating_sub(lines.len() as u16) / 2;
    for (i, line) in lines.iter().enumerate() {
        let col = cols.saturating_sub(line.chars().count() as u16) / 2;
        queue!(out, cursor::MoveTo(col, top + i as u16), Print(line))?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn duration_forms() {
        assert_eq!(parse_duration("7m30s"), Some(secs(450)));
        assert_eq!(parse_duration("0:30"), Some(secs(30)));
        assert_eq!(parse_duration("1:05"), Some(secs(65)));
        assert_eq!(parse_duration("10s"), Some(secs(10)));
        assert_eq!(parse_duration("30"), Some(secs(30)));
        assert_eq!(parse_duration("5m"), Some(secs(300)));
        assert_eq!(parse_duration("abc"), None);
    }

    #[test]
    fn interval_must_exceed_agitation() {
        let plan = Plan {
            total: secs(420),
            initial: secs(30),
            agitation: secs(10),
            interval: secs(10),
            delay: Duration::ZERO,
        };
        assert!(plan.validate().is_err());
        let ok = Plan { interval: secs(30), ..plan };
        assert!(ok.validate().is_ok());
        // Zero agitation disables the cycle, any interval goes.
        let none = Plan { agitation: Duration::ZERO, ..plan };
        assert!(none.validate().is_ok());
    }

    #[test]
    fn phases_in_order() {
        let plan = Plan {
            total: secs(300),
            initial: secs(30),
            agitation: secs(10),
            interval: secs(60),
            delay: secs(5),
        };
        let cycle = plan.cycle().as_secs_f64();
        let at = |t: f64| {
            let since = t - plan.delay.as_secs_f64();
            current_frame(&plan, since, plan.total.as_secs_f64() - since, cycle)
        };

        assert_eq!(at(2.0).label, "wait");
        assert_eq!(at(10.0).label, "AGITATE!"); // initial agitation
        assert_eq!(at(40.0).label, "Developing");
        // 30s initial + 50s develop puts 85s..95s inside the agitation window.
        assert_eq!(at(5.0 + 88.0).label, "AGITATE!");
        assert_eq!(at(5.0 + 100.0).label, "Developing");
        assert_eq!(at(5.0 + 301.0).label, "Done");
    }
}
