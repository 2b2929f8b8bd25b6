use chrono::{DateTime, Datelike, Timelike, Utc};
use uuid::Uuid;

const SUFFIX_LEN: usize = 16;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `ObjectNamer` builds the keys batches are stored under:
/// `<prefix><YYYY>-<MM>-<DD>-<hh>-<mm>-<ss>-<suffix>.json.gz`.
///
/// The timestamp is only there for humans. Uniqueness comes from the random
/// suffix, which is generated once and never re-rolled.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectNamer {
    prefix: String,
    legacy_offsets: bool,
}

impl ObjectNamer {
    /// Namer that renders the true UTC date and time.
    pub fn new(prefix: impl Into<String>) -> ObjectNamer {
        ObjectNamer {
            prefix: prefix.into(),
            legacy_offsets: false,
        }
    }

    /// Add one to the day, hour, minute and second components, matching keys
    /// written by earlier deployments of this pipeline. Those components can
    /// then overflow their ranges (e.g. second `60`, day `32`).
    pub fn with_legacy_offsets(mut self, legacy_offsets: bool) -> ObjectNamer {
        self.legacy_offsets = legacy_offsets;
        self
    }

    /// Key for an object written now.
    pub fn name(&self) -> String {
        self.name_at(Utc::now(), &random_suffix())
    }

    /// Key for an object written at `now` with the given suffix.
    pub fn name_at(&self, now: DateTime<Utc>, suffix: &str) -> String {
        let offset = u32::from(self.legacy_offsets);
        format!(
            "{}{:04}-{:02}-{:02}-{:02}-{:02}-{:02}-{}.json.gz",
            self.prefix,
            now.year(),
            now.month(),
            now.day() + offset,
            now.hour() + offset,
            now.minute() + offset,
            now.second() + offset,
            suffix
        )
    }
}

/// 16 base36 characters drawn from the random bits of a v4 UUID.
pub fn random_suffix() -> String {
    let mut value = random_bits(Uuid::new_v4());
    let mut suffix = [b'0'; SUFFIX_LEN];
    for slot in suffix.iter_mut().rev() {
        *slot = BASE36[(value % 36) as usize];
        value /= 36;
    }
    suffix.iter().map(|&b| b as char).collect()
}

/// The 122 random bits of a v4 UUID, packed into the low bits with the
/// version (bits 76..80) and variant (bits 62..64) fields removed.
fn random_bits(uuid: Uuid) -> u128 {
    let bits = uuid.as_u128();
    let low = bits & ((1 << 62) - 1);
    let mid = (bits >> 64) & 0xfff;
    let high = bits >> 80;
    (high << 74) | (mid << 62) | low
}
