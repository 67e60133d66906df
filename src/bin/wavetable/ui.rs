//! Parameter panel and oscilloscope
//!
//! Terminals rarely report key releases, so the keyboard row toggles notes:
//! press once to start, again to release.

use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::Consumer;

use saavy_wavetable::{ParameterSurface, MAX_UNISON};

/// Samples shown in the oscilloscope.
pub const SCOPE_LEN: usize = 1024;

/// Piano row starting at C4.
const KEYBOARD: [(char, u8); 13] = [
    ('a', 60),
    ('w', 61),
    ('s', 62),
    ('e', 63),
    ('d', 64),
    ('f', 65),
    ('t', 66),
    ('g', 67),
    ('y', 68),
    ('h', 69),
    ('u', 70),
    ('j', 71),
    ('k', 72),
];

const CUTOFF_STEP: f32 = 1.1;
const DETUNE_STEP: f32 = 0.05;

pub struct UiApp {
    surface: ParameterSurface,
    scope_rx: Consumer<f32>,
    scope: Vec<f32>,
    held: [bool; 128],
    unison_size: usize,
    sample_rate: f32,
    should_quit: bool,
}

impl UiApp {
    pub fn new(surface: ParameterSurface, scope_rx: Consumer<f32>, sample_rate: f32) -> Self {
        let unison_size = surface.snapshot().unison_size;
        Self {
            surface,
            scope_rx,
            scope: vec![0.0; SCOPE_LEN],
            held: [false; 128],
            unison_size,
            sample_rate,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_scope();
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.surface.all_notes_off();
        Ok(())
    }

    fn poll_scope(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.scope_rx.pop() {
            self.scope.push(sample);
            received = true;
        }
        if received && self.scope.len() > SCOPE_LEN {
            let excess = self.scope.len() - SCOPE_LEN;
            self.scope.drain(..excess);
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let snapshot = self.surface.snapshot();
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(c @ '1'..='4') => {
                self.surface.set_waveform_index(c as i32 - '1' as i32);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.resize_unison((self.unison_size + 1).min(MAX_UNISON));
            }
            KeyCode::Char('-') => {
                self.resize_unison(self.unison_size.saturating_sub(1).max(1));
            }
            KeyCode::Char(']') => {
                self.surface.set_detune(snapshot.detune + DETUNE_STEP);
            }
            KeyCode::Char('[') => {
                self.surface.set_detune((snapshot.detune - DETUNE_STEP).max(0.0));
            }
            KeyCode::Up => self.surface.set_filter_cutoff(snapshot.cutoff * CUTOFF_STEP),
            KeyCode::Down => self.surface.set_filter_cutoff(snapshot.cutoff / CUTOFF_STEP),
            KeyCode::Right => self.surface.set_filter_resonance(snapshot.resonance + 0.1),
            KeyCode::Left => self.surface.set_filter_resonance(snapshot.resonance - 0.1),
            KeyCode::Char(' ') => {
                self.surface.all_notes_off();
                self.held = [false; 128];
            }
            KeyCode::Char(c) => {
                if let Some(&(_, note)) = KEYBOARD.iter().find(|(k, _)| *k == c) {
                    self.toggle_note(note);
                }
            }
            _ => {}
        }
    }

    fn resize_unison(&mut self, size: usize) {
        if self.surface.set_unison_size(size) {
            self.unison_size = size;
        }
    }

    fn toggle_note(&mut self, note: u8) {
        let held = &mut self.held[usize::from(note)];
        let sent = if *held {
            self.surface.note_off(note, 0.0)
        } else {
            self.surface.note_on(note, 1.0)
        };
        if sent {
            *held = !*held;
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6), // Parameters
                Constraint::Min(8),    // Oscilloscope
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        self.render_params(frame, chunks[0]);
        self.render_scope(frame, chunks[1]);

        let help = Paragraph::new(
            " [a-k] Notes  [1-4] Wave  [+/-] Unison  [[/]] Detune  [↑/↓] Cutoff  [←/→] Q  [Space] Off  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[2]);
    }

    fn render_params(&self, frame: &mut Frame, area: Rect) {
        let snap = self.surface.snapshot();
        let held: Vec<String> = (0..128u8)
            .filter(|&n| self.held[usize::from(n)])
            .map(|n| n.to_string())
            .collect();

        let label = Style::default().fg(Color::DarkGray);
        let value = Style::default().fg(Color::Cyan);
        let lines = vec![
            Line::from(vec![
                Span::styled(" wave ", label),
                Span::styled(format!("{:<10}", snap.waveform.name()), value),
                Span::styled("unison ", label),
                Span::styled(format!("{:<4}", snap.unison_size), value),
                Span::styled("detune ", label),
                Span::styled(format!("{:.2} st", snap.detune), value),
            ]),
            Line::from(vec![
                Span::styled(" cutoff ", label),
                Span::styled(format!("{:<9.0}", snap.cutoff), value),
                Span::styled("Q ", label),
                Span::styled(format!("{:<6.1}", snap.resonance), value),
                Span::styled("lfo ", label),
                Span::styled(
                    format!("{:.1} rad/s ± {:.1} Hz", snap.lfo_rate, snap.lfo_depth),
                    value,
                ),
            ]),
            Line::from(vec![
                Span::styled(" adsr ", label),
                Span::styled(
                    format!(
                        "{:.2}s {:.2}s {:.2} {:.2}s",
                        snap.adsr.attack, snap.adsr.decay, snap.adsr.sustain, snap.adsr.release
                    ),
                    value,
                ),
                Span::styled(format!("   {:.1}kHz", self.sample_rate / 1000.0), label),
            ]),
            Line::from(vec![
                Span::styled(" held ", label),
                Span::styled(held.join(" "), Style::default().fg(Color::Green)),
            ]),
        ];

        let block = Block::default().title(" wavetable ").borders(Borders::ALL);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_scope(&self, frame: &mut Frame, area: Rect) {
        let len = self.scope.len().max(1) as f64;
        let data: Vec<(f64, f64)> = self
            .scope
            .iter()
            .enumerate()
            .map(|(i, &s)| (i as f64 / len, f64::from(s)))
            .collect();

        let dataset = Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&data);

        let chart = Chart::new(vec![dataset])
            .block(Block::default().title(" Output ").borders(Borders::ALL))
            .x_axis(
                Axis::default()
                    .bounds([0.0, 1.0])
                    .style(Style::default().fg(Color::DarkGray)),
            )
            .y_axis(
                Axis::default()
                    .bounds([-1.0, 1.0])
                    .style(Style::default().fg(Color::DarkGray)),
            );

        frame.render_widget(chart, area);
    }
}
