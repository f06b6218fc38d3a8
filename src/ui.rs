use crate::task::{stamp::DISPLAY_FORMAT, Status, Task};
use crossterm::style::{Color, Stylize};
use std::io::IsTerminal;

/// How status markers are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub color: bool,
}

impl Palette {
    /// Colour only when writing to a terminal and neither `--no-color` nor `NO_COLOR` is set.
    pub fn detect(no_color: bool) -> Self {
        let color = !no_color
            && std::io::stdout().is_terminal()
            && std::env::var_os("NO_COLOR").is_none();
        Self { color }
    }

    fn marker_color(status: Status) -> Color {
        match status {
            Status::Todo => Color::Blue,
            Status::InProgress => Color::Yellow,
            Status::Done => Color::Green,
        }
    }

    pub fn marker(&self, status: Status) -> String {
        let label = status.as_str().to_uppercase();
        if self.color {
            label.with(Self::marker_color(status)).bold().to_string()
        } else {
            label
        }
    }
}

pub fn render_task(task: &Task, palette: &Palette) -> String {
    format!(
        "ID: {}\n{} {}\nCreatedAt: {}\nUpdatedAt: {}\n",
        task.id,
        task.description,
        palette.marker(task.status),
        task.created_at.format(DISPLAY_FORMAT),
        task.updated_at.format(DISPLAY_FORMAT),
    )
}

/// Renders a listing, or the empty-state message when there is nothing to show.
pub fn render_list(tasks: &[&Task], filter: Option<Status>, palette: &Palette) -> String {
    if tasks.is_empty() {
        return match filter {
            Some(status) => format!("No tasks with status '{status}'.\n"),
            None => "No tasks yet. Add one with: tasky add <description>\n".to_string(),
        };
    }

    let mut out = String::new();
    for (i, task) in tasks.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&render_task(task, palette));
    }
    out.push_str(&format!("\n{} task(s)\n", tasks.len()));
    out
}
