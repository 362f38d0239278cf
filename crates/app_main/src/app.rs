//! Application main loop
//!
//! Reads shell lines on a helper thread and multiplexes them with the core
//! events and the file watcher on a single thread that owns the controller.

use crate::console::{ConsolePrompter, ConsoleTree, ConsoleViewer};
use anyhow::Result;
use app_core::{
    AppConfig, AppError, Command, CommandId, Event, EventReceiver, EventSender, Focus, FolderTree,
    NavigationController, ThumbnailBackend, ThumbnailLoader,
};
use app_fs::{DefaultFileOperations, FileWatcher, FsEvent, SortBy, SortOrder};
use crossbeam_channel::{select, Receiver, Sender};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::time::Duration;

type Controller = NavigationController<ThumbnailLoader, ConsoleTree, ConsoleViewer, ConsolePrompter>;

/// Longest wait before the file watcher is polled again
const WATCH_POLL: Duration = Duration::from_millis(200);

/// One parsed shell line
#[derive(Debug, Clone, PartialEq)]
enum ShellAction {
    Run(CommandWrapper),
    Click(PathBuf),
    Select(PathBuf),
    List,
    SetSelection(Vec<usize>),
    SetFocus(Focus),
    Set(Setting),
    Status,
    Help,
    Quit,
}

/// Browse settings changeable from the shell
#[derive(Debug, Clone, Copy, PartialEq)]
enum Setting {
    ShowHidden(bool),
    Wrap(bool),
    Sort(SortBy),
    Order(SortOrder),
    Trash(bool),
    ConfirmDelete(bool),
}

impl Setting {
    fn parse(args: &str) -> Option<Self> {
        let (key, value) = args.split_once(char::is_whitespace)?;
        let flag = || match value.trim() {
            "on" | "true" | "yes" => Some(true),
            "off" | "false" | "no" => Some(false),
            _ => None,
        };

        match key {
            "hidden" => flag().map(Setting::ShowHidden),
            "wrap" => flag().map(Setting::Wrap),
            "trash" => flag().map(Setting::Trash),
            "confirm" => flag().map(Setting::ConfirmDelete),
            "sort" => match value.trim() {
                "name" => Some(Setting::Sort(SortBy::Name)),
                "size" => Some(Setting::Sort(SortBy::Size)),
                "modified" => Some(Setting::Sort(SortBy::Modified)),
                "type" => Some(Setting::Sort(SortBy::Extension)),
                _ => None,
            },
            "order" => match value.trim() {
                "asc" => Some(Setting::Order(SortOrder::Ascending)),
                "desc" => Some(Setting::Order(SortOrder::Descending)),
                _ => None,
            },
            _ => None,
        }
    }

    fn apply(self, config: &mut AppConfig) {
        let browser = &mut config.browser;
        match self {
            Setting::ShowHidden(on) => browser.show_hidden_files = on,
            Setting::Wrap(on) => browser.wrap_image_list = on,
            Setting::Sort(by) => browser.sort_by = by,
            Setting::Order(order) => browser.sort_order = order,
            Setting::Trash(on) => browser.use_trash = on,
            Setting::ConfirmDelete(on) => browser.confirm_delete = on,
        }
    }
}

/// `Command` has no `PartialEq`; compare by id and parameters for tests
#[derive(Debug, Clone)]
struct CommandWrapper(Command);

impl PartialEq for CommandWrapper {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (&self.0.params, &other.0.params);
        self.0.id == other.0.id
            && a.int_value == b.int_value
            && a.string_value == b.string_value
            && a.path_value == b.path_value
            && a.copy_modifier == b.copy_modifier
    }
}

const HELP: &str = "\
cd PATH          go to a typed path        click PATH   click a folder in the tree
select PATH      select a tree folder      back | forward | up | home | reload
filter [TEXT]    filter thumbnails by name ls           list thumbnails
sel N...         select thumbnail rows     focus tree|thumbs
open N           view row N                next | prev | first | last | random | close
cut | copy | paste                         rm           delete (tree folder or images)
rename           rename (folder or image)  mkdir        new folder under the tree selection
drop [--copy] [DIR]  drop selection or DIR on the tree folder
explore          open tree folder in file manager
set hidden|wrap|trash|confirm on|off       set sort name|size|modified|type
set order asc|desc                         (settings are saved on exit)
status | help | quit";

fn parse_line(line: &str) -> Option<ShellAction> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let exec = |cmd: Command| Some(ShellAction::Run(CommandWrapper(cmd)));

    match verb {
        "" => None,
        "cd" => exec(Command::new(CommandId::NAV_PATH_BAR).with_string(rest)),
        "click" if !rest.is_empty() => Some(ShellAction::Click(PathBuf::from(rest))),
        "select" if !rest.is_empty() => Some(ShellAction::Select(PathBuf::from(rest))),
        "back" => exec(Command::new(CommandId::NAV_BACK)),
        "forward" => exec(Command::new(CommandId::NAV_FORWARD)),
        "up" => exec(Command::new(CommandId::NAV_UP_FOLDER)),
        "home" => exec(Command::new(CommandId::NAV_HOME)),
        "reload" => exec(Command::new(CommandId::NAV_RELOAD)),
        "filter" => exec(Command::new(CommandId::NAV_FILTER).with_string(rest)),

        "ls" => Some(ShellAction::List),
        "sel" => rest
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<usize>, _>>()
            .ok()
            .map(ShellAction::SetSelection),
        "focus" => match rest {
            "tree" => Some(ShellAction::SetFocus(Focus::Tree)),
            "thumbs" => Some(ShellAction::SetFocus(Focus::Thumbs)),
            _ => None,
        },

        "open" => rest
            .parse::<i64>()
            .ok()
            .and_then(|row| exec(Command::new(CommandId::VIEW_OPEN_ROW).with_int(row))),
        "next" => exec(Command::new(CommandId::VIEW_NEXT_IMAGE)),
        "prev" => exec(Command::new(CommandId::VIEW_PREV_IMAGE)),
        "first" => exec(Command::new(CommandId::VIEW_FIRST_IMAGE)),
        "last" => exec(Command::new(CommandId::VIEW_LAST_IMAGE)),
        "random" => exec(Command::new(CommandId::VIEW_RANDOM_IMAGE)),
        "close" => exec(Command::new(CommandId::VIEW_CLOSE_IMAGE)),

        "cut" => exec(Command::new(CommandId::FILE_CUT)),
        "copy" => exec(Command::new(CommandId::FILE_COPY)),
        "paste" => exec(Command::new(CommandId::FILE_PASTE)),
        "rm" => exec(Command::new(CommandId::FILE_DELETE)),
        "rename" => exec(Command::new(CommandId::FILE_RENAME)),
        "mkdir" => exec(Command::new(CommandId::FILE_NEW_FOLDER)),
        "explore" => exec(Command::new(CommandId::FILE_OPEN_MANAGER)),
        "drop" => {
            let (copy, dir) = match rest.strip_prefix("--copy") {
                Some(dir) => (true, dir.trim()),
                None => (false, rest),
            };
            let mut cmd = Command::new(CommandId::FILE_DROP).with_copy_modifier(copy);
            if !dir.is_empty() {
                cmd = cmd.with_path(dir);
            }
            exec(cmd)
        }

        "set" => Setting::parse(rest).map(ShellAction::Set),
        "status" => Some(ShellAction::Status),
        "help" | "?" => Some(ShellAction::Help),
        "quit" | "exit" | "q" => Some(ShellAction::Quit),
        _ => None,
    }
}

/// Run the shell until `quit`, end of input, or an exit request
pub fn run(config: AppConfig, start: Option<PathBuf>) -> Result<()> {
    let (events_tx, events_rx) = app_core::channel();
    let lines = spawn_input_reader()?;

    let watcher = match FileWatcher::new() {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            tracing::warn!("File watching disabled: {}", e);
            None
        }
    };

    let start = start
        .or_else(|| config.general.start_dir.as_ref().map(PathBuf::from))
        .or_else(|| std::env::current_dir().ok());

    let mut shell = Shell::new(config, events_tx, events_rx, lines, watcher);
    match start {
        Some(path) => shell.ctrl.open_at_startup(&path),
        None => shell.ctrl.go_home(),
    }

    println!("photonav - type \"help\" for commands");

    while shell.step() {}

    shell.save_settings(&AppConfig::config_path());
    tracing::info!("photonav exiting");
    Ok(())
}

/// The controller plus everything the loop multiplexes for it
struct Shell {
    ctrl: Controller,
    config: AppConfig,
    config_changed: bool,
    events: EventReceiver,
    lines: Receiver<String>,
    watcher: Option<FileWatcher>,
    watched_dir: Option<PathBuf>,
}

impl Shell {
    fn new(
        config: AppConfig,
        events_tx: EventSender,
        events: EventReceiver,
        lines: Receiver<String>,
        watcher: Option<FileWatcher>,
    ) -> Self {
        let loader = ThumbnailLoader::new(events_tx, config.browser.list_options());
        let ctrl = NavigationController::new(
            loader,
            ConsoleTree::default(),
            ConsoleViewer::default(),
            ConsolePrompter::new(lines.clone()),
            Box::new(DefaultFileOperations::new()),
            &config,
        );

        Self {
            ctrl,
            config,
            config_changed: false,
            events,
            lines,
            watcher,
            watched_dir: None,
        }
    }

    /// One loop iteration. Returns false when the shell should stop.
    ///
    /// Queued tasks run first. Events already posted are always delivered
    /// before the next batch of tasks, so a task waiting on a load can never
    /// starve the `LoadFinished` it waits for.
    fn step(&mut self) -> bool {
        self.ctrl.run_pending_tasks();

        if let Some(watcher) = self.watcher.as_mut() {
            forward_fs_events(&mut self.ctrl, watcher);
            sync_watcher(watcher, &mut self.watched_dir, self.ctrl.current_dir());
        }

        if self.ctrl.exit_requested() {
            return false;
        }

        let wait = if self.ctrl.has_pending_tasks() {
            Duration::ZERO
        } else {
            WATCH_POLL
        };

        let events = self.events.clone();
        let lines = self.lines.clone();
        select! {
            recv(events) -> event => match event {
                Ok(event) => {
                    self.ctrl.handle_event(event);
                    true
                }
                Err(_) => false,
            },
            recv(lines) -> line => match line {
                Ok(line) => self.dispatch_line(&line),
                Err(_) => {
                    tracing::info!("Input closed");
                    false
                }
            },
            default(wait) => true,
        }
    }

    /// Returns false when the shell should stop
    fn dispatch_line(&mut self, line: &str) -> bool {
        let Some(action) = parse_line(line) else {
            if !line.trim().is_empty() {
                println!("Unknown command, try \"help\"");
            }
            return true;
        };

        let ctrl = &mut self.ctrl;
        match action {
            ShellAction::Run(CommandWrapper(cmd)) => {
                if let Err(e) = ctrl.execute(&cmd) {
                    tracing::debug!("{} failed: {}", cmd.id, e);
                    if matches!(
                        e,
                        AppError::NothingToPaste | AppError::NoSelection | AppError::FolderNotSelected
                    ) {
                        println!("{}", e.user_message());
                    }
                }
            }
            ShellAction::Click(path) => ctrl.handle_event(Event::TreeClicked(path)),
            ShellAction::Select(path) => ctrl.tree_mut().set_selected(&path),
            ShellAction::List => print_rows(ctrl),
            ShellAction::SetSelection(rows) => ctrl.backend_mut().set_selection(&rows),
            ShellAction::SetFocus(focus) => ctrl.set_focus(focus),
            ShellAction::Set(setting) => {
                setting.apply(&mut self.config);
                self.config_changed = true;
                ctrl.apply_config(&self.config);
            }
            ShellAction::Status => print_status(ctrl),
            ShellAction::Help => println!("{}", HELP),
            ShellAction::Quit => return false,
        }

        true
    }

    /// Persist settings changed during the session
    fn save_settings(&self, path: &Path) {
        if !self.config_changed {
            return;
        }
        if let Err(e) = self.config.save_to(path) {
            tracing::warn!("Failed to save configuration: {:#}", e);
        }
    }
}

fn spawn_input_reader() -> Result<Receiver<String>> {
    let (tx, rx) = crossbeam_channel::unbounded();
    std::thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || read_lines(std::io::stdin().lock(), &tx))?;
    Ok(rx)
}

fn read_lines(input: impl BufRead, tx: &Sender<String>) {
    for line in input.lines() {
        match line {
            Ok(line) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("Failed to read input: {}", e);
                break;
            }
        }
    }
}

fn sync_watcher(watcher: &mut FileWatcher, watched_dir: &mut Option<PathBuf>, current: Option<&Path>) {
    let Some(current) = current else {
        return;
    };
    if watched_dir.as_deref() == Some(current) {
        return;
    }

    match watcher.retarget(current) {
        Ok(()) => *watched_dir = Some(current.to_path_buf()),
        Err(e) => {
            tracing::warn!("Failed to watch {}: {}", current.display(), e);
            *watched_dir = None;
        }
    }
}

/// Removal of the displayed directory (or one of its ancestors) reaches the
/// controller the way a folder tree reports vanished rows
fn forward_fs_events(ctrl: &mut Controller, watcher: &FileWatcher) {
    let removed = watcher.poll_events().into_iter().any(|event| match event {
        FsEvent::Removed(path) => ctrl.current_dir().is_some_and(|cur| cur.starts_with(&path)),
        FsEvent::Changed(_) => false,
    });

    if removed {
        ctrl.handle_event(Event::TreeRowsRemoved);
    }
}

fn print_rows(ctrl: &Controller) {
    let selection = ctrl.backend().selected_rows();
    let current = ctrl.backend().current_row();

    for (row, entry) in ctrl.backend().entries().iter().enumerate() {
        let mark = match (current == Some(row), selection.contains(&row)) {
            (true, _) => '>',
            (false, true) => '*',
            _ => ' ',
        };
        let size = entry
            .dimensions
            .map(|(w, h)| format!("{}x{}", w, h))
            .unwrap_or_else(|| "?".to_string());
        println!("{}{:4}  {:<40} {}", mark, row, entry.name, size);
    }
}

fn print_status(ctrl: &Controller) {
    let dir = ctrl
        .current_dir()
        .map(|d| d.display().to_string())
        .unwrap_or_else(|| "<none>".to_string());
    let tree = ctrl
        .tree()
        .selected_path()
        .map(|d| d.display().to_string())
        .unwrap_or_else(|| "<none>".to_string());

    println!("dir:       {}", dir);
    println!("tree:      {}", tree);
    println!("view:      {:?}, focus {:?}", ctrl.view_mode(), ctrl.focus());
    println!(
        "history:   {} entries, at {:?}",
        ctrl.history().len(),
        ctrl.history().current_index()
    );
    match ctrl.clipboard().mode() {
        Some(mode) => println!("clipboard: {:?} {} file(s)", mode, ctrl.clipboard().pending_files().len()),
        None => println!("clipboard: empty"),
    }
}
