use super::po::Catalog;
use crate::utils::error::{GettextError, Result};
use std::collections::HashMap;
use std::path::Path;

const MAGIC: u32 = 0x950412de;
const HEADER_LEN: usize = 28;

impl Catalog {
    /// Compiles to GNU MO. Fuzzy and untranslated entries are left out; the
    /// header always goes in.
    pub fn to_mo(&self) -> Vec<u8> {
        let mut entries: Vec<(String, String)> = vec![(String::new(), self.header.mo_value())];
        entries.extend(
            self.messages
                .iter()
                .filter(|m| !m.is_fuzzy() && m.is_translated())
                .map(|m| (m.mo_key(), m.mo_value())),
        );
        entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
        entries.dedup_by(|a, b| a.0 == b.0);

        let count = entries.len();
        let originals_table = HEADER_LEN;
        let translations_table = originals_table + 8 * count;
        let strings_start = translations_table + 8 * count;

        let mut tables = Vec::with_capacity(16 * count);
        let mut strings = Vec::new();

        let mut originals = Vec::with_capacity(count);
        for (key, _) in &entries {
            originals.push((key.len(), strings_start + strings.len()));
            strings.extend_from_slice(key.as_bytes());
            strings.push(0);
        }
        let mut translations = Vec::with_capacity(count);
        for (_, value) in &entries {
            translations.push((value.len(), strings_start + strings.len()));
            strings.extend_from_slice(value.as_bytes());
            strings.push(0);
        }
        for (len, offset) in originals.into_iter().chain(translations) {
            push_u32(&mut tables, len);
            push_u32(&mut tables, offset);
        }

        let mut out = Vec::with_capacity(strings_start + strings.len());
        out.extend_from_slice(&MAGIC.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        push_u32(&mut out, count);
        push_u32(&mut out, originals_table);
        push_u32(&mut out, translations_table);
        // no hash table
        push_u32(&mut out, 0);
        push_u32(&mut out, strings_start);
        out.extend_from_slice(&tables);
        out.extend_from_slice(&strings);
        out
    }

    pub fn write_mo<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_mo())?;
        Ok(())
    }
}

fn push_u32(out: &mut Vec<u8>, value: usize) {
    // MO offsets are 32-bit; catalogs beyond 4 GiB are not representable.
    out.extend_from_slice(&(value as u32).to_le_bytes());
}

/// Lookup table read from a compiled MO file.
#[derive(Debug, Clone, Default)]
pub struct MoCatalog {
    entries: HashMap<String, Vec<String>>,
}

impl MoCatalog {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let magic = read_u32(bytes, 0, true)?;
        let little_endian = match magic {
            MAGIC => true,
            _ if magic.swap_bytes() == MAGIC => false,
            other => {
                return Err(GettextError::InvalidMoFile {
                    message: format!("bad magic number {:#010x}", other),
                })
            }
        };

        let count = read_u32(bytes, 8, little_endian)? as usize;
        let originals = read_u32(bytes, 12, little_endian)? as usize;
        let translations = read_u32(bytes, 16, little_endian)? as usize;

        for (name, table) in [("original", originals), ("translation", translations)] {
            let end = count.checked_mul(8).and_then(|len| len.checked_add(table));
            if end.map_or(true, |end| end > bytes.len()) {
                return Err(GettextError::InvalidMoFile {
                    message: format!(
                        "{} table of {} strings at offset {} runs past the end of the file",
                        name, count, table
                    ),
                });
            }
        }

        let mut entries = HashMap::with_capacity(count);
        for i in 0..count {
            let key = read_string(bytes, originals + 8 * i, little_endian)?;
            let value = read_string(bytes, translations + 8 * i, little_endian)?;

            // plural entries are keyed by their singular msgid
            let singular = key.split('\0').next().unwrap_or_default().to_string();
            let forms = value.split('\0').map(String::from).collect();
            entries.insert(singular, forms);
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn header(&self) -> Option<&str> {
        self.entries.get("").and_then(|forms| forms.first()).map(String::as_str)
    }

    pub fn get(&self, msgid: &str) -> Option<&str> {
        if msgid.is_empty() {
            return None;
        }
        self.entries
            .get(msgid)
            .and_then(|forms| forms.first())
            .map(String::as_str)
    }

    pub fn get_in_context(&self, context: &str, msgid: &str) -> Option<&str> {
        self.get(&format!("{}\u{4}{}", context, msgid))
    }

    /// Uses the `n != 1` plural rule.
    pub fn get_plural(&self, msgid: &str, n: u32) -> Option<&str> {
        let forms = self.entries.get(msgid)?;
        let index = usize::from(n != 1).min(forms.len().saturating_sub(1));
        forms.get(index).map(String::as_str)
    }
}

fn read_u32(bytes: &[u8], offset: usize, little_endian: bool) -> Result<u32> {
    let raw: [u8; 4] = bytes
        .get(offset..offset + 4)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| GettextError::InvalidMoFile {
            message: format!("truncated at offset {}", offset),
        })?;

    Ok(if little_endian {
        u32::from_le_bytes(raw)
    } else {
        u32::from_be_bytes(raw)
    })
}

fn read_string(bytes: &[u8], descriptor: usize, little_endian: bool) -> Result<String> {
    let len = read_u32(bytes, descriptor, little_endian)? as usize;
    let offset = read_u32(bytes, descriptor + 4, little_endian)? as usize;

    let raw = bytes
        .get(offset..offset + len)
        .ok_or_else(|| GettextError::InvalidMoFile {
            message: format!("string at offset {} runs past the end of the file", offset),
        })?;

    String::from_utf8(raw.to_vec()).map_err(|e| GettextError::InvalidMoFile {
        message: format!("string at offset {} is not UTF-8: {}", offset, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Message;

    fn sample() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.set_headers(&[(
            "Content-Type".to_string(),
            "text/plain; charset=UTF-8".to_string(),
        )]);
        catalog.messages = vec![
            Message::new("Controller string", "Cadena de controlador"),
            Message::new("Untranslated", ""),
            Message {
                flags: vec!["fuzzy".to_string()],
                ..Message::new("Guess", "Adivinanza")
            },
            Message {
                context: Some("menu".to_string()),
                ..Message::new("Open", "Abrir")
            },
            Message {
                msgid_plural: Some("%d files".to_string()),
                msgstr: vec!["Un archivo".to_string(), "%d archivos".to_string()],
                ..Message::new("One file", "")
            },
        ];
        catalog
    }

    #[test]
    fn test_compiled_catalog_resolves_translated_entries() {
        let mo = MoCatalog::from_bytes(&sample().to_mo()).unwrap();

        assert_eq!(mo.len(), 4);
        assert_eq!(mo.get("Controller string"), Some("Cadena de controlador"));
        assert_eq!(mo.get("Untranslated"), None);
        assert_eq!(mo.get("Guess"), None);
        assert_eq!(mo.get_in_context("menu", "Open"), Some("Abrir"));
        assert_eq!(mo.get_plural("One file", 1), Some("Un archivo"));
        assert_eq!(mo.get_plural("One file", 3), Some("%d archivos"));
        assert!(mo.header().unwrap().contains("charset=UTF-8"));
    }

    #[test]
    fn test_layout_matches_gnu_format() {
        let bytes = sample().to_mo();

        assert_eq!(&bytes[0..4], &MAGIC.to_le_bytes());
        assert_eq!(u32::from_le_bytes(bytes[8..12].try_into().unwrap()), 4);
        assert_eq!(u32::from_le_bytes(bytes[12..16].try_into().unwrap()), 28);
        assert_eq!(u32::from_le_bytes(bytes[16..20].try_into().unwrap()), 28 + 32);
        assert_eq!(u32::from_le_bytes(bytes[20..24].try_into().unwrap()), 0);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            MoCatalog::from_bytes(b"not a catalog at all, sorry"),
            Err(GettextError::InvalidMoFile { .. })
        ));
        assert!(matches!(
            MoCatalog::from_bytes(&[0xde, 0x12]),
            Err(GettextError::InvalidMoFile { .. })
        ));
    }

    #[test]
    fn test_rejects_string_count_beyond_file() {
        let mut header = Vec::new();
        for word in [MAGIC, 0, u32::MAX, 28, 28, 0, 28] {
            header.extend_from_slice(&word.to_le_bytes());
        }
        assert!(matches!(
            MoCatalog::from_bytes(&header),
            Err(GettextError::InvalidMoFile { .. })
        ));

        let mut truncated = sample().to_mo();
        truncated.truncate(40);
        assert!(matches!(
            MoCatalog::from_bytes(&truncated),
            Err(GettextError::InvalidMoFile { .. })
        ));
    }

    #[test]
    fn test_reads_big_endian_files() {
        let little = sample().to_mo();
        let mut big = Vec::with_capacity(little.len());
        let words = 7 + 4 * 4;
        for chunk in little[..words * 4].chunks(4) {
            big.extend(chunk.iter().rev());
        }
        big.extend_from_slice(&little[words * 4..]);

        let mo = MoCatalog::from_bytes(&big).unwrap();
        assert_eq!(mo.get("Controller string"), Some("Cadena de controlador"));
    }
}
