//! Two-language UI text.

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    En,
    Es,
}

impl Lang {
    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Es => "es",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Lang::En),
            "es" => Some(Lang::Es),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Lang::En => Lang::Es,
            Lang::Es => Lang::En,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Text {
    NavHome,
    NavAbout,
    HeroTitle,
    HeroSubtitle,
    SearchPrompt,
    SearchPlaceholder,
    ColTrack,
    ColYear,
    ColSize,
    ColAction,
    AboutTitle,
    AboutP1,
    AboutP2,
    LabelSync,
    TicketButton,
    IntroButton,
    PlayerIdle,
    VolumeLabel,
    NoResults,
    Loading,
    StatusOnline,
    StatusCached,
    StatusOffline,
    LoadFailed,
    RateLimited,
    FormAlias,
    FormMessage,
    FormCaptcha,
    FormSend,
    FormSent,
    FormCooldown,
    FormSending,
    FormError,
    FormCaptchaMissing,
    FormRequired,
    FormUnavailable,
    DefaultArtist,
    DownloadSaved,
    DownloadFailed,
    KeyHints,
    FormHints,
}

/// Look up `key` in `lang`.
pub fn t(lang: Lang, key: Text) -> &'static str {
    match lang {
        Lang::En => en(key),
        Lang::Es => es(key),
    }
}

fn en(key: Text) -> &'static str {
    use Text::*;
    match key {
        NavHome => "[HOME]",
        NavAbout => "[ABOUT]",
        HeroTitle => "THE VAULT",
        HeroSubtitle => "/// UNRELEASED AUDIO ARCHIVE V.3.0",
        SearchPrompt => "> QUERY:",
        SearchPlaceholder => "SEARCH...",
        ColTrack => "TRACK NAME",
        ColYear => "YEAR",
        ColSize => "SIZE",
        ColAction => "ACT",
        AboutTitle => "/// PROJECT MANIFESTO",
        AboutP1 => "THE ARCHIVE IS A DIGITAL SANCTUARY DEDICATED TO THE PRESERVATION OF RARE AUDITORY ARTIFACTS FROM THE OPIUM ERA.",
        AboutP2 => "WE DO NOT OWN THE RIGHTS TO THESE RECORDINGS. THIS IS A NON-PROFIT FAN INITIATIVE.",
        LabelSync => "> LAST SYNC:",
        TicketButton => "[ SUBMIT TICKET ]",
        IntroButton => "[ ENTER ARCHIVE ]",
        PlayerIdle => "NO ACTIVE SIGNAL",
        VolumeLabel => "VOL",
        NoResults => "NO DATA FOUND IN ARCHIVE...",
        Loading => "> ESTABLISHING CONNECTION...",
        StatusOnline => "ONLINE",
        StatusCached => "CACHE",
        StatusOffline => "OFFLINE",
        LoadFailed => "> DATABASE CONNECTION FAILED.",
        RateLimited => "> API RATE LIMIT REACHED. TRY AGAIN LATER.",
        FormAlias => "ALIAS / CODENAME *",
        FormMessage => "MESSAGE / LINK *",
        FormCaptcha => "CAPTCHA TOKEN *",
        FormSend => "[ SEND DATA ]",
        FormSent => "/// TRANSMISSION SENT ///",
        FormCooldown => "/// SYSTEM COOLDOWN: WAIT {min} MIN ///",
        FormSending => "SENDING...",
        FormError => "> SYSTEM ERROR",
        FormCaptchaMissing => "> CAPTCHA REQUIRED",
        FormRequired => "> FILL IN ALL REQUIRED FIELDS",
        FormUnavailable => "> TICKET ENDPOINT NOT CONFIGURED",
        DefaultArtist => "UNKNOWN",
        DownloadSaved => "> SAVED:",
        DownloadFailed => "> DOWNLOAD FAILED:",
        KeyHints => "SPACE play  N/P next/prev  ←/→ skip/seek  ↑/↓ vol  / search  TAB about  L lang  T ticket  D save  R reload  Q quit",
        FormHints => "TAB next field  ENTER send  ESC close",
    }
}

fn es(key: Text) -> &'static str {
    use Text::*;
    match key {
        NavHome => "[INICIO]",
        NavAbout => "[ACERCA]",
        HeroTitle => "LA BÓVEDA",
        HeroSubtitle => "/// ARCHIVO DE AUDIO INÉDITO V.3.0",
        SearchPrompt => "> BÚSQUEDA:",
        SearchPlaceholder => "BUSCAR...",
        ColTrack => "NOMBRE PISTA",
        ColYear => "AÑO",
        ColSize => "PESO",
        ColAction => "ACT",
        AboutTitle => "/// MANIFIESTO DEL PROYECTO",
        AboutP1 => "SANTUARIO DIGITAL PARA LA PRESERVACIÓN DE ARTEFACTOS AUDITIVOS DE LA ERA OPIUM.",
        AboutP2 => "NO POSEEMOS LOS DERECHOS DE ESTAS GRABACIONES. ESTA ES UNA INICIATIVA DE FANS SIN FINES DE LUCRO.",
        LabelSync => "> ULT. SINC:",
        TicketButton => "[ ENVIAR TICKET ]",
        IntroButton => "[ INICIAR SISTEMA ]",
        PlayerIdle => "SIN SEÑAL ACTIVA",
        VolumeLabel => "VOL",
        NoResults => "NO SE ENCONTRARON DATOS...",
        Loading => "> ESTABLECIENDO CONEXIÓN...",
        StatusOnline => "EN LÍNEA",
        StatusCached => "CACHÉ",
        StatusOffline => "SIN CONEXIÓN",
        LoadFailed => "> FALLO DE CONEXIÓN CON LA BASE DE DATOS.",
        RateLimited => "> LÍMITE DE LA API ALCANZADO. INTENTE MÁS TARDE.",
        FormAlias => "ALIAS / CODIGO *",
        FormMessage => "MENSAJE / ENLACE *",
        FormCaptcha => "TOKEN CAPTCHA *",
        FormSend => "[ ENVIAR DATOS ]",
        FormSent => "/// TRANSMISIÓN ENVIADA ///",
        FormCooldown => "/// ENFRIAMIENTO DEL SISTEMA: ESPERE {min} MIN ///",
        FormSending => "ENVIANDO...",
        FormError => "> ERROR DEL SISTEMA",
        FormCaptchaMissing => "> CAPTCHA REQUERIDO",
        FormRequired => "> COMPLETE TODOS LOS CAMPOS OBLIGATORIOS",
        FormUnavailable => "> ENDPOINT DE TICKETS NO CONFIGURADO",
        DefaultArtist => "DESCONOCIDO",
        DownloadSaved => "> GUARDADO:",
        DownloadFailed => "> DESCARGA FALLIDA:",
        KeyHints => "ESPACIO reproducir  N/P sig/ant  ←/→ saltar  ↑/↓ vol  / buscar  TAB acerca  L idioma  T ticket  D guardar  R recargar  Q salir",
        FormHints => "TAB siguiente campo  ENTER enviar  ESC cerrar",
    }
}

/// Cooldown notice with the remaining minutes filled in.
pub fn cooldown_message(lang: Lang, minutes: u64) -> String {
    t(lang, Text::FormCooldown).replace("{min}", &minutes.to_string())
}
