use super::{RenderSurface, Scene, SurfaceEvent};
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::{self, Stdout, Write};

/// Prints each scene as a level-ordered, group-coloured node listing.
///
/// Terminal layout is immediate, so every `show` reports a redraw followed by
/// stabilization right away.
pub struct TerminalSurface<W: Write = Stdout> {
    out: W,
    scene: Option<Scene>,
    selected: Vec<String>,
    physics: bool,
    fits: usize,
    events: Vec<SurfaceEvent>,
}

impl TerminalSurface<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            scene: None,
            selected: Vec::new(),
            physics: false,
            fits: 0,
            events: Vec::new(),
        }
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn physics(&self) -> bool {
        self.physics
    }

    pub fn fit_count(&self) -> usize {
        self.fits
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print_scene(&mut self, scene: &Scene) -> io::Result<()> {
        writeln!(
            self.out,
            "{} {} nodes, {} arcs",
            "graph:".cyan().bold(),
            scene.nodes.len(),
            scene.edges.len()
        )?;

        let mut rows: BTreeMap<i64, Vec<String>> = BTreeMap::new();
        for placed in &scene.nodes {
            let colors = scene.style.for_group(placed.node.group);
            let bg = colors.background;
            let label = format!(" {} ", placed.node.display_label())
                .black()
                .on_truecolor(bg.r, bg.g, bg.b);
            rows.entry(placed.y.round() as i64)
                .or_default()
                .push(format!("{} {}", label, format!("[{}]", placed.node.id).dimmed()));
        }

        for (y, labels) in rows {
            writeln!(self.out, "  {:>6}  {}", y.to_string().dimmed(), labels.join("  "))?;
        }
        Ok(())
    }
}

impl<W: Write> RenderSurface for TerminalSurface<W> {
    fn show(&mut self, scene: &Scene) {
        let _ = self.print_scene(scene);
        self.scene = Some(scene.clone());
        self.selected.clear();
        self.physics = scene.physics;
        self.events.push(SurfaceEvent::Redraw);
        self.events.push(SurfaceEvent::Stabilized);
    }

    fn set_physics(&mut self, enabled: bool) {
        self.physics = enabled;
        if !enabled {
            self.events.push(SurfaceEvent::Redraw);
        }
    }

    fn select_nodes(&mut self, ids: &[String]) {
        self.selected = ids.to_vec();
        if !ids.is_empty() {
            let _ = writeln!(self.out, "{} {}", "selected:".cyan(), ids.join(", "));
        }
        self.events.push(SurfaceEvent::Redraw);
    }

    fn fit(&mut self) {
        self.fits += 1;
    }

    fn drain_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }
}
