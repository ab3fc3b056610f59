//! Modo watch: re-valida el snapshot cada vez que se modifica en disco.
//! Cada ejecución reemplaza al reporte anterior.

use crate::commands::validate::{persist, validate_snapshot};
use crate::commands::{build_validator, resolve_snapshot_path};
use crate::ui;
use colored::*;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn ejecutar(project_root: &Path, snapshot: &Path) {
    // La configuración y las reglas extra se releen en cada pasada
    let validator = build_validator(project_root, true);
    match validate_snapshot(&validator, snapshot) {
        Ok(report) => {
            ui::imprimir_reporte(&report);
            if validator.config().persist_last_report {
                persist(project_root, &report, true);
            }
        }
        Err(e) => eprintln!("{} {}", "❌".red(), e),
    }
}

/// El evento escribe, crea o renombra hacia el archivo del snapshot.
pub fn afecta_snapshot(event: &Event, snapshot: &Path) -> bool {
    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
        return false;
    }
    let Some(name) = snapshot.file_name() else {
        return false;
    };
    event.paths.iter().any(|p| p.file_name() == Some(name))
}

pub fn start_watch(project_root: &Path, snapshot: &str) {
    ui::mostrar_banner();

    let path = resolve_snapshot_path(snapshot);
    if !path.exists() {
        eprintln!("{} El snapshot '{}' no existe.", "❌".red(), path.display());
        std::process::exit(2);
    }

    ejecutar(project_root, &path);

    // Se vigila el directorio: un reemplazo por rename cambia el inodo del archivo
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let (tx, rx) = mpsc::channel();
    let snapshot_watcher = path.clone();
    let mut watcher = match notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        if let Ok(event) = res {
            if afecta_snapshot(&event, &snapshot_watcher) {
                let _ = tx.send(());
            }
        }
    }) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("{} No se pudo iniciar el watcher: {}", "❌".red(), e);
            std::process::exit(2);
        }
    };

    if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
        eprintln!("{} No se pudo vigilar {}: {}", "❌".red(), dir.display(), e);
        std::process::exit(2);
    }

    println!(
        "\n{} {}",
        "👁️  Vigilando".bright_cyan().bold(),
        path.display().to_string().yellow()
    );

    while rx.recv().is_ok() {
        // debounce
        thread::sleep(Duration::from_millis(500));
        while rx.try_recv().is_ok() {}

        println!("\n{}", "🔄 Cambio detectado, re-validando...".cyan());
        ejecutar(project_root, &path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, ModifyKind, RemoveKind, RenameMode};
    use std::path::PathBuf;

    fn snapshot() -> PathBuf {
        PathBuf::from("/tmp/pages/page.json")
    }

    #[test]
    fn test_in_place_write_triggers() {
        let event = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(snapshot());
        assert!(afecta_snapshot(&event, &snapshot()));
    }

    #[test]
    fn test_rename_into_place_triggers() {
        let event = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::To)))
            .add_path(PathBuf::from("/tmp/pages/page.json"));
        assert!(afecta_snapshot(&event, &snapshot()));

        let both = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/tmp/pages/.page.json.tmp"))
            .add_path(PathBuf::from("/tmp/pages/page.json"));
        assert!(afecta_snapshot(&both, &snapshot()));

        let created = Event::new(EventKind::Create(CreateKind::File)).add_path(snapshot());
        assert!(afecta_snapshot(&created, &snapshot()));
    }

    #[test]
    fn test_unrelated_events_are_ignored() {
        let sibling = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(PathBuf::from("/tmp/pages/other.json"));
        assert!(!afecta_snapshot(&sibling, &snapshot()));

        let access = Event::new(EventKind::Access(AccessKind::Read)).add_path(snapshot());
        assert!(!afecta_snapshot(&access, &snapshot()));

        let removed = Event::new(EventKind::Remove(RemoveKind::File)).add_path(snapshot());
        assert!(!afecta_snapshot(&removed, &snapshot()));
    }
}
