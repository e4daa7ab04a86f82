use anyhow::{Result, bail};
use clap::Args;
use jobtree_application::{DropResult, HierarchyService, MoveReport, VisibleRow};
use jobtree_core::Anchor;
use jobtree_core::drag::{Boundary, DropZone};
use jobtree_core::hierarchy::ExpansionState;

/// Where a new task goes among its siblings (last by default).
#[derive(Args)]
#[group(multiple = false)]
pub struct Placement {
    /// Place before every sibling
    #[arg(long)]
    first: bool,
    /// Place right before this sibling
    #[arg(long)]
    before: Option<String>,
    /// Place right after this sibling
    #[arg(long)]
    after: Option<String>,
}

impl Placement {
    fn anchor(self) -> Anchor {
        match (self.first, self.before, self.after) {
            (true, _, _) => Anchor::First,
            (_, Some(id), _) => Anchor::Before(id),
            (_, _, Some(id)) => Anchor::After(id),
            _ => Anchor::Last,
        }
    }
}

pub fn drop_zone(nest: Option<String>, before: Option<String>, after: Option<String>) -> Result<DropZone> {
    Ok(match (nest, before, after) {
        (Some(id), None, None) => DropZone::nest(id),
        (None, Some(id), None) => DropZone::reorder(id, Boundary::Before),
        (None, None, Some(id)) => DropZone::reorder(id, Boundary::After),
        _ => bail!("exactly one of --nest, --before or --after is required"),
    })
}

pub async fn tree(service: &HierarchyService, job: &str, expand: Option<Vec<String>>, json: bool) -> Result<()> {
    let index = service.snapshot(job).await?;
    let expanded: ExpansionState = match expand {
        Some(ids) => ids.into_iter().collect(),
        None => {
            let mut all = ExpansionState::new();
            all.expand_all(&index);
            all
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&index.tree(&expanded))?);
        return Ok(());
    }

    let rows = service.visible_rows(job, &expanded).await?;
    if rows.is_empty() {
        println!("(job '{}' has no tasks)", job);
    }
    for row in &rows {
        println!("{}", render_row(row));
    }
    Ok(())
}

fn render_row(row: &VisibleRow) -> String {
    let marker = match (row.has_children, row.expanded) {
        (false, _) => "-",
        (true, true) => "v",
        (true, false) => ">",
    };
    format!(
        "{}{} {} [{:?}] ({})",
        "  ".repeat(row.depth),
        marker,
        row.title,
        row.status,
        row.id
    )
}

pub async fn add(
    service: &HierarchyService,
    job: &str,
    title: &str,
    parent: Option<&str>,
    place: Placement,
) -> Result<()> {
    let task = service.create_task(job, title, parent, place.anchor()).await?;
    println!("Created {} at {}", task.id, task.position);
    Ok(())
}

pub async fn move_tasks(service: &HierarchyService, job: &str, task_ids: Vec<String>, zone: DropZone) -> Result<()> {
    let mut session = service.begin_drag(job, task_ids).await?;
    match service.finish_drag(job, &mut session, Some(zone)).await? {
        DropResult::Cancelled => bail!("drop target is not valid for the selected tasks"),
        DropResult::Applied(report) => print_report(&report),
    }
    Ok(())
}

pub async fn indent(service: &HierarchyService, job: &str, task_id: &str) -> Result<()> {
    match service.indent(job, task_id).await? {
        Some(report) => print_report(&report),
        None => println!("{} has no previous sibling to nest under", task_id),
    }
    Ok(())
}

pub async fn outdent(service: &HierarchyService, job: &str, task_id: &str) -> Result<()> {
    match service.outdent(job, task_id).await? {
        Some(report) => print_report(&report),
        None => println!("{} is already a root task", task_id),
    }
    Ok(())
}

fn print_report(report: &MoveReport) {
    for update in &report.updates {
        println!(
            "{} -> parent {}, position {}",
            update.id,
            update.parent_id.as_deref().unwrap_or("(root)"),
            update.position
        );
    }
    for fallback in &report.anchor_fallbacks {
        println!(
            "warning: {} was appended at the end ({} is not a sibling)",
            fallback.task_id, fallback.anchor_id
        );
    }
}
