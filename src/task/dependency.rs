//! Edit helpers for establishing dependency links between tasks.
//!
//! Blocking semantics themselves (`is_blocked` / `is_blocking`) live on
//! [`Task`]; this module owns id generation and the copy-with-overrides
//! edits that wire two tasks together. A dangling dependency id is not an
//! error anywhere in the crate: it simply never matches a task and so never
//! blocks.

use uuid::Uuid;

use super::Task;

const ID_LENGTH: usize = 6;
const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a short id not present in `existing_ids`.
///
/// Ids are six characters of `[0-9a-z]`, drawn from uuid entropy. The loop
/// regenerates on collision; with 36^6 possibilities collisions are rare
/// even in large vaults.
#[must_use]
pub fn generate_unique_id(existing_ids: &[String]) -> String {
    loop {
        let bytes = Uuid::new_v4().into_bytes();
        let id: String = bytes
            .iter()
            .take(ID_LENGTH)
            .map(|b| ID_ALPHABET[(*b as usize) % ID_ALPHABET.len()] as char)
            .collect();

        if !existing_ids.iter().any(|existing| *existing == id) {
            return id;
        }
    }
}

/// Return `child` unchanged if it already has an id, or a copy carrying a
/// freshly generated one.
#[must_use]
pub fn ensure_task_has_id(child: Task, existing_ids: &[String]) -> Task {
    if !child.id().is_empty() {
        return child;
    }

    let id = generate_unique_id(existing_ids);
    child.with(|overrides| overrides.id(id))
}

/// Make `parent` depend on `child`, giving `child` an id if needed.
///
/// Returns `(new_parent, new_child)`; either may be the input value when no
/// change was required.
#[must_use]
pub fn add_dependency(parent: Task, child: Task, existing_ids: &[String]) -> (Task, Task) {
    let child = ensure_task_has_id(child, existing_ids);

    let parent = if parent.depends_on().contains(&child.id().to_string()) {
        parent
    } else {
        let mut depends_on = parent.depends_on().to_vec();
        depends_on.push(child.id().to_string());
        parent.with(|overrides| overrides.depends_on(depends_on))
    };

    (parent, child)
}

/// Remove `parent`'s dependency on `child`, if present.
#[must_use]
pub fn remove_dependency(parent: Task, child: &Task) -> Task {
    if !parent.depends_on().contains(&child.id().to_string()) {
        return parent;
    }

    let depends_on: Vec<String> = parent
        .depends_on()
        .iter()
        .filter(|id| *id != child.id())
        .cloned()
        .collect();
    parent.with(|overrides| overrides.depends_on(depends_on))
}
