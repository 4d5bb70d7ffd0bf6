// Crisis resource directory

use serde::Serialize;

/// A hotline or service surfaced to a person in crisis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrisisResource {
    pub name: &'static str,
    pub contact: &'static str,
    pub availability: &'static str,
}

impl CrisisResource {
    /// "Name: contact" form used in alerts and recommendations
    pub fn label(&self) -> String {
        format!("{}: {}", self.name, self.contact)
    }
}

const EN: &[CrisisResource] = &[
    CrisisResource {
        name: "988 Suicide & Crisis Lifeline",
        contact: "Call or text 988",
        availability: "24/7",
    },
    CrisisResource {
        name: "Crisis Text Line",
        contact: "Text HOME to 741741",
        availability: "24/7",
    },
];

const ES: &[CrisisResource] = &[
    CrisisResource {
        name: "988 Lifeline en Español",
        contact: "Llama al 988 y marca 2",
        availability: "24/7",
    },
    CrisisResource {
        name: "Línea 024 de atención a la conducta suicida",
        contact: "Llama al 024",
        availability: "24/7",
    },
];

const FR: &[CrisisResource] = &[CrisisResource {
    name: "Numéro national de prévention du suicide",
    contact: "Appelez le 3114",
    availability: "24/7",
}];

const DE: &[CrisisResource] = &[CrisisResource {
    name: "TelefonSeelsorge",
    contact: "0800 111 0 111",
    availability: "24/7",
}];

const INTERNATIONAL: CrisisResource = CrisisResource {
    name: "Find a Helpline",
    contact: "https://findahelpline.com",
    availability: "Directory",
};

const EMERGENCY: CrisisResource = CrisisResource {
    name: "Emergency services",
    contact: "Call your local emergency number",
    availability: "24/7",
};

/// Hotlines by language code, with English as the default
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceDirectory;

impl ResourceDirectory {
    pub fn new() -> Self {
        Self
    }

    /// Whether localized resources exist for the language ("es-MX" matches "es")
    pub fn has_language(&self, language_code: &str) -> bool {
        Self::localized(language_code).is_some()
    }

    fn localized(language_code: &str) -> Option<&'static [CrisisResource]> {
        let primary = language_code
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match primary.as_str() {
            "en" => Some(EN),
            "es" => Some(ES),
            "fr" => Some(FR),
            "de" => Some(DE),
            _ => None,
        }
    }

    /// Hotlines for the language plus the international directory
    pub fn hotlines(&self, language_code: Option<&str>) -> Vec<CrisisResource> {
        let mut resources: Vec<CrisisResource> = language_code
            .and_then(Self::localized)
            .unwrap_or(EN)
            .to_vec();
        resources.push(INTERNATIONAL);
        resources
    }

    /// Hotlines preceded by emergency services, for emergency mode
    pub fn emergency(&self, language_code: Option<&str>) -> Vec<CrisisResource> {
        let mut resources = vec![EMERGENCY];
        resources.extend(self.hotlines(language_code));
        resources
    }

    /// Hotline labels, ready for display
    pub fn hotline_labels(&self, language_code: Option<&str>) -> Vec<String> {
        self.hotlines(language_code).iter().map(|r| r.label()).collect()
    }
}
