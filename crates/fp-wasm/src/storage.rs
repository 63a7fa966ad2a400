//! `localStorage` access for the last shown plan.

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub fn load_string(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

pub fn save_string(key: &str, value: &str) {
    let Some(storage) = local_storage() else {
        log::debug!("localStorage unavailable; {key} not saved");
        return;
    };
    if storage.set_item(key, value).is_err() {
        log::warn!("could not write {key} to localStorage");
    }
}
