use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
};

use super::DashboardInterface;
use crate::core::channels::Channel;
use crate::core::pipeline::{ColorTag, PipelineStage};

const CARD_WIDTH: u16 = 76;
const CARD_HEIGHT: u16 = 34;
const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(super) fn tag_color(tag: ColorTag) -> Color {
    match tag {
        ColorTag::Cyan => Color::Cyan,
        ColorTag::Purple => Color::Magenta,
        ColorTag::Pink => Color::LightMagenta,
        ColorTag::Emerald => Color::Green,
        ColorTag::Slate => Color::Gray,
        ColorTag::Blue => Color::Blue,
        ColorTag::Indigo => Color::LightBlue,
    }
}

/// Fixed-size card centered in `area`, shrunk to fit small terminals.
pub(super) fn card_area(area: Rect) -> Rect {
    let width = CARD_WIDTH.min(area.width);
    let height = CARD_HEIGHT.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn muted() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(muted())
}

impl DashboardInterface {
    pub(super) fn draw(&self, f: &mut Frame) {
        let card = card_area(f.area());
        f.render_widget(Clear, card);
        let outer = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue));
        let inner = outer.inner(card);
        f.render_widget(outer, card);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // header
                Constraint::Length(4), // stats
                Constraint::Min(12),   // pipeline
                Constraint::Length(6), // insight
                Constraint::Length(2), // footer
            ])
            .split(inner);

        f.render_widget(self.render_header(), chunks[0]);
        self.render_stats(f, chunks[1]);
        self.render_pipeline(f, chunks[2]);
        f.render_widget(self.render_insight(), chunks[3]);
        f.render_widget(self.render_footer(), chunks[4]);
    }

    fn render_header(&self) -> Paragraph<'_> {
        let button = if self.insight.is_in_flight() {
            let frame = SPINNER[self.thinking_tick % SPINNER.len()];
            Span::styled(
                format!(" {} Analyzing... ", frame),
                Style::default().fg(Color::White).bg(Color::DarkGray),
            )
        } else {
            Span::styled(
                " ✦ Generate Insight [g] ",
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            )
        };

        Paragraph::new(vec![
            Line::from(vec![
                Span::styled(" ⚡ ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    "CONTENTFLOW",
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("   "),
                button,
            ]),
            Line::from(Span::styled(
                "    AI Marketing Suite",
                Style::default().fg(Color::LightBlue),
            )),
        ])
    }

    fn render_stats(&self, f: &mut Frame, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(area);

        let cards = [
            (
                "TOTAL REACH",
                format!("{}M", self.metrics.reach),
                "12.5%",
                ColorTag::Cyan,
            ),
            (
                "AVG. ROI",
                format!("{}x", self.metrics.roi),
                "8.2%",
                ColorTag::Purple,
            ),
            ("ACTIVE LEADS", "2.8k".to_string(), "22.1%", ColorTag::Pink),
        ];

        for ((label, value, change, color), col) in cards.into_iter().zip(cols.iter()) {
            let widget = Paragraph::new(vec![
                Line::from(vec![
                    Span::styled(label, Style::default().fg(tag_color(color))),
                    Span::styled(format!("  ↑ {}", change), Style::default().fg(Color::Green)),
                ]),
                Line::from(Span::styled(
                    value,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
            ])
            .block(panel(""));
            f.render_widget(widget, *col);
        }
    }

    fn render_pipeline(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Line::from(vec![
                Span::styled(" CAMPAIGN PIPELINE ", muted()),
                Span::styled("● Live ", Style::default().fg(Color::Green)),
            ]))
            .borders(Borders::ALL)
            .border_style(muted());
        let inner = block.inner(area);
        f.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(6)])
            .split(inner);

        let tabs = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 4),
                Constraint::Ratio(1, 4),
                Constraint::Ratio(1, 4),
                Constraint::Ratio(1, 4),
            ])
            .split(rows[0]);

        for (i, stage) in PipelineStage::ALL.iter().enumerate() {
            f.render_widget(self.render_stage_tab(*stage, i), tabs[i]);
        }

        self.render_stage_detail(f, rows[1]);
    }

    fn render_stage_tab(&self, stage: PipelineStage, index: usize) -> Paragraph<'_> {
        let info = stage.info();
        let active = stage == self.active_stage;
        let (title_style, border_style) = if active {
            let color = tag_color(info.color);
            (
                Style::default().fg(color).add_modifier(Modifier::BOLD),
                Style::default().fg(color),
            )
        } else {
            (Style::default().fg(Color::Gray), muted())
        };

        Paragraph::new(vec![
            Line::from(Span::styled(
                format!("{} {}", index + 1, info.title),
                title_style,
            )),
            Line::from(Span::styled(info.description, muted())),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        )
    }

    fn render_stage_detail(&self, f: &mut Frame, area: Rect) {
        let info = self.active_stage.info();
        let show_channels = self.active_stage == PipelineStage::Distribution;

        let mut constraints = vec![
            Constraint::Length(1), // status line
            Constraint::Length(1), // gauge
            Constraint::Length(1), // metric
        ];
        if show_channels {
            constraints.push(Constraint::Length(1));
            constraints.push(Constraint::Length(1));
        }
        constraints.push(Constraint::Min(0));

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let status = Line::from(vec![
            Span::styled(
                format!(" {} Status", info.title),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("   {}% Complete", info.progress), muted()),
        ]);
        f.render_widget(Paragraph::new(status), rows[0]);

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
            .percent(info.progress.min(100))
            .label("");
        f.render_widget(gauge, rows[1]);

        let metric = Line::from(vec![
            Span::styled(format!(" {}: ", info.metric.to_uppercase()), muted()),
            Span::styled(
                info.metric_value,
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]);
        f.render_widget(Paragraph::new(metric), rows[2]);

        if show_channels {
            let heading = Line::from(Span::styled(
                " TARGET DISTRIBUTION CHANNELS",
                Style::default()
                    .fg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD),
            ));
            f.render_widget(Paragraph::new(heading), rows[3]);
            f.render_widget(Paragraph::new(self.render_channel_row()), rows[4]);
        }
    }

    fn render_channel_row(&self) -> Line<'_> {
        let mut spans = vec![Span::raw(" ")];
        for channel in Channel::ALL {
            let selected = self.channels.contains(channel);
            let marker = if selected { "■" } else { "□" };
            let style = if selected {
                Style::default()
                    .fg(tag_color(channel.color()))
                    .add_modifier(Modifier::BOLD)
            } else {
                muted()
            };
            spans.push(Span::styled(
                format!("{} {} [{}]", marker, channel.name(), channel.hotkey()),
                style,
            ));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }

    fn render_insight(&self) -> Paragraph<'_> {
        let title_style = Style::default()
            .fg(Color::LightBlue)
            .add_modifier(Modifier::BOLD);
        let body = if self.insight.is_in_flight() {
            let frame = SPINNER[self.thinking_tick % SPINNER.len()];
            Line::from(Span::styled(
                format!("{} composing strategy...", frame),
                Style::default().fg(Color::Yellow),
            ))
        } else {
            Line::from(Span::styled(
                format!("\"{}\"", self.insight.text().trim()),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::ITALIC),
            ))
        };

        Paragraph::new(body)
            .block(
                Block::default()
                    .title(Span::styled(" ✦ GEMINI OPTIMIZATION INSIGHT ", title_style))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Blue)),
            )
            .wrap(Wrap { trim: true })
    }

    fn render_footer(&self) -> Paragraph<'_> {
        let status = Line::from(vec![
            Span::styled(" ●", Style::default().fg(Color::Green)),
            Span::styled("●", Style::default().fg(Color::Yellow)),
            Span::styled("● ", Style::default().fg(Color::Red)),
            Span::styled("SYSTEM LATENCY: 42MS", muted()),
            Span::styled("   INTERACTIVE", muted()),
            Span::styled("   v2.4.0-Stable", Style::default().fg(Color::LightBlue)),
        ]);
        let second = if self.last_log.is_empty() {
            Line::from(Span::styled(
                " ←/→ stage  1-4 jump  x/l/i/f/t channels  g generate  q quit",
                muted(),
            ))
        } else {
            Line::from(Span::styled(format!(" {}", self.last_log), muted()))
        };
        Paragraph::new(vec![status, second])
    }
}
