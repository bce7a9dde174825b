use console::{Emoji, style};

use crate::core::metrics::MetricsSnapshot;

pub static INFO_ICON: Emoji<'_, '_> = Emoji("ℹ️  ", "");
pub static ERROR_ICON: Emoji<'_, '_> = Emoji("❌ ", "");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");
pub static CHART: Emoji<'_, '_> = Emoji("📈 ", "");

pub fn print_info(msg: &str) {
    println!("{} {}", INFO_ICON, style(msg).blue());
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", ERROR_ICON, style(msg).red().bold());
}

pub fn print_insight(text: &str) {
    println!("{} {}", SPARKLE, style(format!("\"{}\"", text)).italic().cyan());
}

pub fn print_snapshot(snapshot: &MetricsSnapshot) {
    println!(
        "{} {} reach {}  roi {}",
        CHART,
        style(format!("#{:<3}", snapshot.tick)).dim(),
        style(format!("{}M", snapshot.reach)).bold().cyan(),
        style(format!("{}x", snapshot.roi)).bold().magenta()
    );
}

/// A titled block of `command  description` rows for help output.
pub struct GuideSection {
    title: &'static str,
    commands: Vec<(&'static str, &'static str)>,
}

impl GuideSection {
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            commands: Vec::new(),
        }
    }

    pub fn command(mut self, name: &'static str, description: &'static str) -> Self {
        self.commands.push((name, description));
        self
    }

    pub fn print(&self) {
        println!(" {}", style(self.title).bold().underlined());
        for (name, description) in &self.commands {
            println!(
                "   {} {}",
                style(format!("{:<28}", name)).green(),
                style(description).dim()
            );
        }
        println!();
    }
}

pub fn print_banner() {
    let lines: &[&str] = &[
        "  ___ ___  _  _ _____ ___ _  _ _____ ___ _    _____      __",
        " / __/ _ \\| \\| |_   _| __| \\| |_   _| __| |  / _ \\ \\    / /",
        "| (_| (_) | .` | | | | _|| .` | | | | _|| |_| (_) \\ \\/\\/ / ",
        " \\___\\___/|_|\\_| |_| |___|_|\\_| |_| |_| |____\\___/ \\_/\\_/  ",
    ];

    // Gradient: #4f46e5 → #22d3ee, left to right
    let from: (u8, u8, u8) = (79, 70, 229);
    let to: (u8, u8, u8) = (34, 211, 238);
    let max_w = lines.iter().map(|l| l.len()).max().unwrap_or(1) as u32;

    println!();
    for line in lines {
        for (x, ch) in line.chars().enumerate() {
            if ch == ' ' {
                print!(" ");
                continue;
            }
            let t = (x as u32 * 1000 / max_w).min(1000);
            let (r, g, b) = lerp_color(from, to, t);
            print!("\x1b[38;2;{};{};{}m{}", r, g, b, ch);
        }
        println!();
    }
    print!("\x1b[0m");

    println!("\x1b[38;2;129;140;248mAI Marketing Suite\x1b[0m\n");
}

fn lerp_color(a: (u8, u8, u8), b: (u8, u8, u8), t: u32) -> (u8, u8, u8) {
    let r = (a.0 as u32 * (1000 - t) + b.0 as u32 * t) / 1000;
    let g = (a.1 as u32 * (1000 - t) + b.1 as u32 * t) / 1000;
    let b_val = (a.2 as u32 * (1000 - t) + b.2 as u32 * t) / 1000;
    (r as u8, g as u8, b_val as u8)
}

pub fn print_goodbye() {
    println!(
        "\n{} {}",
        SPARKLE,
        style("Campaign paused. See you next launch!").bold().cyan()
    );
}
