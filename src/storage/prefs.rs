use crate::i18n::Lang;

use super::store::{StoreHandle, read_key, write_key};

pub const VOLUME_KEY: &str = "vault_volume";
pub const LANG_KEY: &str = "vault_lang";

/// Volume and language, read once at startup and written on every change.
pub struct Preferences {
    store: StoreHandle,
    default_lang: Lang,
}

impl Preferences {
    pub fn new(store: StoreHandle, default_lang: Lang) -> Self {
        Self {
            store,
            default_lang,
        }
    }

    /// Stored volume in `[0, 1]`; 1.0 when missing or unreadable.
    pub fn volume(&self) -> f32 {
        read_key(&self.store, VOLUME_KEY)
            .and_then(|v| v.trim().parse::<f32>().ok())
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 1.0))
            .unwrap_or(1.0)
    }

    pub fn set_volume(&self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        write_key(&self.store, VOLUME_KEY, &volume.to_string());
    }

    pub fn lang(&self) -> Lang {
        read_key(&self.store, LANG_KEY)
            .and_then(|code| Lang::from_code(&code))
            .unwrap_or(self.default_lang)
    }

    pub fn set_lang(&self, lang: Lang) {
        write_key(&self.store, LANG_KEY, lang.code());
    }
}
