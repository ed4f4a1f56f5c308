//! Localization tables and lookup.
//!
//! Lookup falls back from the requested language to English, then to the
//! raw key, so a lookup never fails. An empty table cell counts as a
//! missing translation.

use quakewatch_types::Language;

/// Translation keys. The key doubles as the English text.
pub mod keys {
    /// Application title.
    pub const TITLE: &str = "Ethiopia Earthquake Tracker";
    /// Alert headline and push title.
    pub const EARTHQUAKE_ALERT: &str = "Earthquake Alert!";
    /// Place label.
    pub const LOCATION: &str = "Location";
    /// Magnitude label.
    pub const MAGNITUDE: &str = "Magnitude";
    /// Time label.
    pub const TIME: &str = "Time";
    /// ETA label.
    pub const ESTIMATED_TIME: &str = "Estimated time until shaking";
    /// Seconds unit.
    pub const SECONDS: &str = "seconds";
    /// Closing line of the alert message.
    pub const TAKE_PRECAUTIONS: &str = "Take immediate precautions!";
    /// History list heading.
    pub const PREVIOUS_EARTHQUAKES: &str = "Previous Earthquakes";
    /// Realtime list heading.
    pub const REALTIME_EARTHQUAKES: &str = "Realtime Earthquakes";
    /// Safety section heading.
    pub const SAFETY_INSTRUCTIONS: &str = "Safety Instructions";
    /// Affected-area popup label.
    pub const AFFECTED_AREA: &str = "Affected Area";
    /// First safety instruction.
    pub const SAFETY_STAY_CALM: &str = "Stay calm and move to a safe location.";
    /// Second safety instruction.
    pub const SAFETY_DROP_COVER: &str = "Drop, Cover, and Hold on.";
    /// Third safety instruction.
    pub const SAFETY_AVOID_WINDOWS: &str = "Avoid windows and outer walls.";
    /// Fourth safety instruction.
    pub const SAFETY_CHECK_INJURIES: &str = "Check for injuries and help others.";
    /// Realtime row note when the user is inside the radius.
    pub const WITHIN_RADIUS: &str = "You are within the affected radius.";
    /// Toggle label when notifications are off.
    pub const ENABLE_PUSH: &str = "Enable Push Notifications";
    /// Toggle label when notifications are on.
    pub const DISABLE_PUSH: &str = "Disable Push Notifications";

    /// The safety instructions in display order.
    pub const SAFETY_LIST: [&str; 4] = [
        SAFETY_STAY_CALM,
        SAFETY_DROP_COVER,
        SAFETY_AVOID_WINDOWS,
        SAFETY_CHECK_INJURIES,
    ];
}

/// `(key, [en, am, or, ti])`, columns in [`Language::ALL`] order.
const TABLE: &[(&str, [&str; 4])] = &[
    (
        keys::TITLE,
        [
            "Ethiopia Earthquake Tracker",
            "የኢትዮጵያ የመሬት መንቀጥቀጥ መከታተያ",
            "Hordoffii Sochii Lafaa Itoophiyaa",
            "ኢትዮጵያ ምንቅጥቃጥ ምድሪ መከታተሊ",
        ],
    ),
    (
        keys::EARTHQUAKE_ALERT,
        [
            "Earthquake Alert!",
            "የመሬት መንቀጥቀጥ ማስጠንቀቂያ!",
            "Akeekkachiisa Sochii lafaa!",
            "ምንቅጥቃጥ ምድሪ ኣጠንቅቖ!",
        ],
    ),
    (keys::LOCATION, ["Location", "ቦታ", "Bakka", "ቦታ"]),
    (keys::MAGNITUDE, ["Magnitude", "የሬክተር መጠን", "Guddina", "ዓቐን"]),
    (keys::TIME, ["Time", "ጊዜ", "Yeroo", "ግዜ"]),
    (
        keys::ESTIMATED_TIME,
        [
            "Estimated time until shaking",
            "እስኪንቀጠቀጥ የሚገመት ጊዜ",
            "Yeroo hamma sochoon",
            "ግዜ ክሳብ ምንቅጥቃጥ",
        ],
    ),
    (keys::SECONDS, ["seconds", "ሰከንዶች", "sekondii", "ሰከንዶች"]),
    (
        keys::TAKE_PRECAUTIONS,
        [
            "Take immediate precautions!",
            "አስቸኳይ ጥንቃቄዎችን ያድርጉ!",
            "Of eeggannoo hatattamaa godhaa!",
            "ቅልጡፍ ጥንቃቐታት ግበሩ!",
        ],
    ),
    (
        keys::PREVIOUS_EARTHQUAKES,
        [
            "Previous Earthquakes",
            "ያለፉ የመሬት መንቀጥቀጦች",
            "Sochii lafaa kan duraanii",
            "ዝሓለፈ ምንቅጥቃጥ ምድሪ",
        ],
    ),
    (
        keys::REALTIME_EARTHQUAKES,
        [
            "Realtime Earthquakes",
            "የአሁኑ የመሬት መንቀጥቀጦች",
            "Sochii lafaa kan amma",
            "ናይ ሕጂ ምንቅጥቃጥ ምድሪ",
        ],
    ),
    (
        keys::SAFETY_INSTRUCTIONS,
        [
            "Safety Instructions",
            "የደህንነት መመሪያዎች",
            "Qajeelfamoota Nageenyaa",
            "መምርሒታት ድሕንነት",
        ],
    ),
    (
        keys::AFFECTED_AREA,
        ["Affected Area", "የተጎዳ አካባቢ", "Bakka Miidhame", "ዝተጎድአ ከባቢ"],
    ),
    (
        keys::SAFETY_STAY_CALM,
        [
            "Stay calm and move to a safe location.",
            "ረጋ ብለው ወደ ደህንነቱ የተጠበቀ ቦታ ይሂዱ።",
            "Tasgabbaa’aa ta’aa gara bakka nagaa deemaa.",
            "ህድእ ኢልኩም ናብ ድሕንቲ ቦታ ውሰዱ።",
        ],
    ),
    (
        keys::SAFETY_DROP_COVER,
        [
            "Drop, Cover, and Hold on.",
            "አጎንብሱ፣ ሸፍኑ እና ያዙ።",
            "Gadi bu’aa, Haguugaa, fi Qabaadhaa.",
            "ጎብለል በሉ ፡ ክትመቱ ፡ ሓዝዎ።",
        ],
    ),
    (
        keys::SAFETY_AVOID_WINDOWS,
        [
            "Avoid windows and outer walls.",
            "መስኮቶችን እና ውጫዊ ግድግዳዎችን ያስወግዱ።",
            "Foddaa fi dallaa alaati irraa fagaadhaa.",
            "መስኮትን ናይ ወጻኢ መንደራትን ተዓቀቡ።",
        ],
    ),
    (
        keys::SAFETY_CHECK_INJURIES,
        [
            "Check for injuries and help others.",
            "ጉዳቶችን ይፈትሹ እና ሌሎችን ያግዙ።",
            "Miidhaa jiraachuu isaa mirkaneeffadhaa fi warra kaaniif gargaaraa.",
            "ጉድኣት እንተሃልዩ ፈትሹ ንኻልኦት ሓግዙ።",
        ],
    ),
    (
        keys::WITHIN_RADIUS,
        [
            "You are within the affected radius.",
            "እርስዎ በተጎዳው ራዲየስ ውስጥ ነዎት።",
            "Ati raadiyaasii miidhamaa keessa jirta.",
            "ኣብ ዉሽጢ ራድዮስ ተጽዕኖ ኣለኻ።",
        ],
    ),
    (
        keys::ENABLE_PUSH,
        [
            "Enable Push Notifications",
            "መልዕክት ማሳወቂያ አብራ",
            "Beeksisa Dhiibbaa Aktiveessaa",
            "ናይ መግፋሕቲ መፍለጢ ኣነቓቕሑ",
        ],
    ),
    (
        keys::DISABLE_PUSH,
        [
            "Disable Push Notifications",
            "መልዕክት ማሳወቂያ አጥፋ",
            "Beeksisa Dhiibbaa Dhaamsaa",
            "ናይ መግፋሕቲ መፍለጢ ኣጥፍእ",
        ],
    ),
];

/// Column of `lang` in [`TABLE`].
const fn column(lang: Language) -> usize {
    match lang {
        Language::En => 0,
        Language::Am => 1,
        Language::Or => 2,
        Language::Ti => 3,
    }
}

fn cell(key: &str, lang: Language) -> Option<&'static str> {
    TABLE
        .iter()
        .find(|(k, _)| *k == key)
        .and_then(|(_, row)| row.get(column(lang)).copied())
        .filter(|text| !text.is_empty())
}

/// Translate `key` into `lang`, falling back to English, then to `key`.
pub fn tr(key: &str, lang: Language) -> &str {
    cell(key, lang)
        .or_else(|| cell(key, Language::En))
        .unwrap_or(key)
}

/// Translate `key` for a raw language code. Unsupported codes behave as
/// if the translation were missing and fall back to English.
pub fn translate<'a>(key: &'a str, code: &str) -> &'a str {
    let lang = Language::from_code(code).unwrap_or_default();
    tr(key, lang)
}
