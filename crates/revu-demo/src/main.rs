#![forbid(unsafe_code)]

//! Showcase: a task-list application on the revu engine.
//!
//! Three views hang off one store. Each pass, every view decides for
//! itself whether its slice of state changed; the printed output shows
//! which views actually redrew after each command.

use revu::{Dep, Selector, Store, View};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Default)]
struct App {
    tasks: Vec<String>,
    selected: Option<usize>,
}

#[derive(Debug)]
enum Command {
    Add(String),
    Rename(usize, String),
    Select(usize),
}

fn reduce(app: &mut App, command: Command) {
    match command {
        Command::Add(name) => app.tasks.push(name),
        Command::Rename(index, name) => {
            if let Some(task) = app.tasks.get_mut(index) {
                *task = name;
            }
        }
        Command::Select(index) => {
            if index < app.tasks.len() {
                app.selected = Some(index);
            }
        }
    }
}

fn build_tree() -> View<App, usize> {
    let mut header = View::with_selector(
        "header",
        Selector::new1(Dep::value(|a: &App| a.tasks.len()), |n, _| *n),
        |count: &usize| println!("== tasks ({count}) =="),
    );

    // Element-wise comparison: a pass that clones the task list without
    // touching its contents does not repaint the list.
    let list: View<App, Vec<String>> = View::with_selector(
        "list",
        Selector::new1(Dep::sequence(|a: &App| a.tasks.clone()), |tasks, _| {
            tasks.clone()
        }),
        |tasks: &Vec<String>| {
            for (i, task) in tasks.iter().enumerate() {
                println!("  {}. {task}", i + 1);
            }
        },
    );

    let status: View<App, String> = View::with_selector(
        "status",
        Selector::new2(
            Dep::value(|a: &App| a.selected),
            Dep::value(|a: &App| a.tasks.len()),
            |selected, total, _| match selected {
                Some(index) => format!("selected {}/{total}", index + 1),
                None => format!("nothing selected ({total} total)"),
            },
        ),
        |line: &String| println!("-- {line}"),
    );

    header.add_child(list);
    header.add_child(status);
    header
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let store = Store::new(App::default(), reduce);
    store.mount(build_tree());

    for command in [
        Command::Add("write the selector layer".into()),
        Command::Add("wire up the store".into()),
        Command::Select(0),
        Command::Rename(1, "wire up the command queue".into()),
    ] {
        info!(?command, "dispatch");
        store.dispatch(command);
    }

    store.unmount();
}
