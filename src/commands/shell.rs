use crate::api::{connect, load_config, open_fixture};
use crate::cli::ShellArgs;
use crate::config::Config;
use crate::controller::{GraphViewController, ViewOptions};
use crate::model::ListMode;
use crate::present::{classpath_markdown, report_markdown};
use crate::render::{Hit, RenderSurface, TerminalSurface};
use crate::service::GraphService;
use crate::session::Session;
use crate::state::{DetailPanel, Page, ViewState};
use crate::style;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

pub const HELP: &str = "\
commands:
  click node <id> | click edge <id> | click none
  select <id>                  select a node and show its detail
  arc <id>                     show why one node depends on another
  mode <collapsed|leafs-collapsed|expanded|collapse-parent>
  filter <label>               toggle a filter (jar, dir, package, class, cycles only)
  implied on|off               only show what the selected node requires
  search <text>                select a node by name
  page graph|classpath|reports
  status
  help
  quit";

/// One line of shell input.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Click(Hit),
    Select(String),
    Arc(String),
    Mode(ListMode),
    Filter(String),
    Implied(bool),
    Search(String),
    Page(Page),
    Status,
    Help,
    Quit,
}

/// Parses a shell line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let required = |what: &str| {
        if rest.is_empty() {
            Err(format!("'{}' needs {}", word, what))
        } else {
            Ok(rest.to_string())
        }
    };

    let command = match word {
        "click" => {
            let (target, id) = match rest.split_once(char::is_whitespace) {
                Some((target, id)) => (target, id.trim()),
                None => (rest, ""),
            };
            match (target, id) {
                ("none", _) | ("", _) => ShellCommand::Click(Hit::None),
                ("node", id) if !id.is_empty() => ShellCommand::Click(Hit::Node(id.to_string())),
                ("edge", id) if !id.is_empty() => ShellCommand::Click(Hit::Edge(id.to_string())),
                _ => return Err("usage: click node <id> | click edge <id> | click none".into()),
            }
        }
        "select" => ShellCommand::Select(required("a node id")?),
        "arc" => ShellCommand::Arc(required("an arc id")?),
        "mode" => ShellCommand::Mode(
            required("a list mode")?
                .parse()
                .map_err(|e: crate::model::ParseListModeError| e.to_string())?,
        ),
        "filter" => ShellCommand::Filter(required("a filter label")?),
        "implied" => match rest {
            "on" => ShellCommand::Implied(true),
            "off" => ShellCommand::Implied(false),
            _ => return Err("usage: implied on|off".into()),
        },
        "search" => ShellCommand::Search(required("a name")?),
        "page" => match rest {
            "graph" => ShellCommand::Page(Page::Graph),
            "classpath" => ShellCommand::Page(Page::Classpath),
            "reports" => ShellCommand::Page(Page::Reports),
            _ => return Err("usage: page graph|classpath|reports".into()),
        },
        "status" => ShellCommand::Status,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };
    Ok(Some(command))
}

pub fn cmd_shell(args: ShellArgs) -> i32 {
    let mut config = load_config(&args.config_dir).unwrap_or_else(|e| {
        style::warning(&format!("Failed to load config: {}. Using defaults.", e));
        Config::default()
    });

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            style::error(&format!("Failed to start runtime: {}", e));
            return 1;
        }
    };

    let code = match args.fixture {
        Some(path) => match open_fixture(&path) {
            Ok(backend) => {
                style::status(&format!("answering from fixture {}", style::path(&path)));
                rt.block_on(run(backend, config.view))
            }
            Err(e) => {
                style::error(&e.to_string());
                1
            }
        },
        None => {
            if let Some(url) = args.backend {
                config.backend.url = url;
            }
            match connect(&config) {
                Ok(service) => {
                    style::status(&format!("connecting to {}", style::url(&config.backend.url)));
                    rt.block_on(run(service, config.view))
                }
                Err(e) => {
                    style::error(&e.to_string());
                    1
                }
            }
        }
    };

    // stdin reads may still be parked on a blocking thread
    rt.shutdown_background();
    code
}

async fn run<S: GraphService + 'static>(service: S, options: ViewOptions) -> i32 {
    let controller = GraphViewController::new(TerminalSurface::stdout(), options);
    let mut session = Session::new(service, controller);
    let mut printer = Printer::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    session.start();
    style::hint("type 'help' for commands");

    loop {
        printer.flush(session.controller_mut().state_mut());
        if session.in_flight() == 0 {
            printer.prompt(session.controller().state());
        }

        tokio::select! {
            completion = session.next_completion(), if session.in_flight() > 0 => {
                if let Some(completion) = completion {
                    session.apply(completion);
                }
            }
            line = lines.next_line() => {
                printer.prompted = false;
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        style::error(&format!("Failed to read input: {}", e));
                        return 1;
                    }
                };
                match parse_command(&line) {
                    Ok(Some(ShellCommand::Quit)) => break,
                    Ok(Some(command)) => execute(&mut session, command),
                    Ok(None) => {}
                    Err(msg) => style::error(&msg),
                }
            }
        }
    }

    info!("shell closed");
    0
}

fn execute<S, R>(session: &mut Session<S, R>, command: ShellCommand)
where
    S: GraphService + 'static,
    R: RenderSurface,
{
    match command {
        ShellCommand::Click(hit) => session.gesture(|c| c.on_click(hit)),
        ShellCommand::Select(id) => session.gesture(|c| c.select_node(&id)),
        ShellCommand::Arc(id) => session.gesture(|c| c.show_arc_detail(&id)),
        ShellCommand::Mode(mode) => {
            if session.controller().state().selected_node().is_none() {
                style::hint("select a node first");
            }
            session.gesture(|c| c.change_list_mode(mode));
        }
        ShellCommand::Filter(label) => session.gesture(|c| c.set_filter(&label)),
        ShellCommand::Implied(enabled) => {
            if session.controller().state().selected_node().is_none() {
                style::hint("select a node first");
            }
            session.gesture(|c| c.implied_only(enabled));
        }
        ShellCommand::Search(text) => session.gesture(|c| c.search_by_name(&text)),
        ShellCommand::Page(page) => {
            let state = session.controller_mut().state_mut();
            if page == Page::Graph {
                state.show_graph_page();
            } else {
                state.page = page;
            }
            print_page(state);
        }
        ShellCommand::Status => print_status(session.controller().state()),
        ShellCommand::Help => println!("{}", HELP),
        ShellCommand::Quit => {}
    }
}

/// Tracks what has already been printed so only changes are shown.
#[derive(Default)]
struct Printer {
    project_name: Option<String>,
    panel: Option<DetailPanel>,
    prompted: bool,
}

impl Printer {
    fn flush(&mut self, state: &mut ViewState) {
        for note in state.take_notifications() {
            style::notification(&note);
            self.prompted = false;
        }

        if state.project_name.is_some() && self.project_name != state.project_name {
            self.project_name = state.project_name.clone();
            style::header(&format!(
                "project: {}",
                self.project_name.as_deref().unwrap_or_default()
            ));
            self.prompted = false;
        }

        if self.panel.as_ref() != Some(&state.panel) {
            print_panel(&state.panel);
            self.panel = Some(state.panel.clone());
            self.prompted = false;
        }
    }

    fn prompt(&mut self, state: &ViewState) {
        if self.prompted {
            return;
        }
        print!("{}", style::prompt(state.selected_node()));
        let _ = io::stdout().flush();
        self.prompted = true;
    }
}

fn print_panel(panel: &DetailPanel) {
    let mut out = io::stdout();
    let _ = style::render_markdown(&panel.markup, &mut out);
    for action in &panel.actions {
        println!("  mode {} ({})", kebab(action.mode), action.label);
    }
}

fn kebab(mode: ListMode) -> String {
    mode.wire_name().to_ascii_lowercase().replace('_', "-")
}

fn print_page(state: &ViewState) {
    let mut out = io::stdout();
    let markdown = match state.page {
        Page::Graph => {
            style::status(&format!(
                "graph page: {} nodes, {} arcs",
                state.snapshot.nodes.len(),
                state.snapshot.edges.len()
            ));
            return;
        }
        Page::Classpath => classpath_markdown(&state.classpath),
        Page::Reports => {
            let reports = [
                ("Unreferenced classes", &state.reports.unreferenced),
                ("Missing classes", &state.reports.missing),
                ("Metrics", &state.reports.metrics),
            ];
            reports
                .iter()
                .map(|(title, report)| match report {
                    Some(report) => report_markdown(title, report),
                    None => format!("### {}\n\n_not loaded yet_\n", title),
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    };
    let _ = style::render_markdown(&markdown, &mut out);
}

fn print_status(state: &ViewState) {
    println!(
        "{}",
        style::metric("project", state.project_name.as_deref().unwrap_or("?"))
    );
    println!("{}", style::metric("nodes", state.snapshot.nodes.len()));
    println!("{}", style::metric("arcs", state.snapshot.edges.len()));
    println!(
        "{}",
        style::metric("selected", state.selected_node().unwrap_or("-"))
    );
    if let Some(inspected) = &state.list_mode {
        println!("{}", style::metric("list mode", kebab(inspected.mode)));
    }
    let filters = if state.active_filters.is_empty() {
        "-".to_string()
    } else {
        state.active_filters.join(", ")
    };
    println!("{}", style::metric("filters", filters));
    println!("{}", style::metric("zoom locked", state.zoom_locked));
    println!("{}", style::metric("page", format!("{:?}", state.page).to_lowercase()));
}
