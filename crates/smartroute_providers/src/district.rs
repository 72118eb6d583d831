//! Offline approximation of an address by the centre of the district it names.
//!
//! Used as a last resort when the text search collaborator is unavailable or
//! has no answer. The result is jittered so stops in the same district don't
//! collapse onto a single point.

use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{geocoding::Geocoder, track_asia_api::ProviderError};

/// `(key, lat, lng)`; numeric keys are matched after a `quan`/`q.`/`district` prefix.
const DISTRICT_LOCATIONS: &[(&str, f64, f64)] = &[
    ("1", 10.7756, 106.7004),
    ("3", 10.7844, 106.6843),
    ("4", 10.7578, 106.7013),
    ("5", 10.7540, 106.6634),
    ("6", 10.7481, 106.6352),
    ("7", 10.7340, 106.7130),
    ("8", 10.7241, 106.6286),
    ("10", 10.7746, 106.6669),
    ("11", 10.7629, 106.6502),
    ("12", 10.8672, 106.6411),
    ("binh thanh", 10.8106, 106.7091),
    ("thu duc", 10.8494, 106.7537),
    ("go vap", 10.8387, 106.6653),
    ("phu nhuan", 10.7992, 106.6805),
    ("tan binh", 10.8015, 106.6523),
    ("tan phu", 10.7901, 106.6281),
    ("binh tan", 10.7652, 106.6038),
    ("binh chanh", 10.6874, 106.5911),
    ("nha be", 10.6952, 106.7048),
    ("hoc mon", 10.8863, 106.5921),
    ("cu chi", 11.0067, 106.5132),
    ("hoan kiem", 21.0285, 105.8542),
    ("ba dinh", 21.0341, 105.8372),
    ("dong da", 21.0129, 105.8277),
    ("hai ba trung", 21.0126, 105.8570),
    ("hoang mai", 20.9760, 105.8549),
    ("thanh xuan", 20.9935, 105.8115),
    ("long bien", 21.0374, 105.8828),
    ("nam tu liem", 21.0128, 105.7609),
    ("bac tu liem", 21.0625, 105.7485),
    ("tay ho", 21.0560, 105.8202),
    ("cau giay", 21.0362, 105.7906),
    ("ha dong", 20.9636, 105.7632),
];

const DISTRICT_PREFIXES: [&str; 4] = ["quan", "q.", "q", "district"];

const DIACRITIC_FOLDS: [(&str, char); 7] = [
    ("àáạảãâầấậẩẫăằắặẳẵ", 'a'),
    ("èéẹẻẽêềếệểễ", 'e'),
    ("ìíịỉĩ", 'i'),
    ("òóọỏõôồốộổỗơờớợởỡ", 'o'),
    ("ùúụủũưừứựửữ", 'u'),
    ("ỳýỵỷỹ", 'y'),
    ("đ", 'd'),
];

/// Half-width of the jitter box, in degrees.
const JITTER_DEGREES: f64 = 0.0075;

pub struct DistrictGeocoder {
    rng: Mutex<StdRng>,
}

impl Default for DistrictGeocoder {
    fn default() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }
}

impl DistrictGeocoder {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// District centre for the address, without jitter.
    pub fn district_centre(address: &str) -> Option<geo_types::Point> {
        let folded = fold_diacritics(address);

        let by_number = district_number(&folded).and_then(|number| {
            DISTRICT_LOCATIONS
                .iter()
                .find(|(key, _, _)| *key == number)
        });

        by_number
            .or_else(|| {
                DISTRICT_LOCATIONS.iter().find(|(key, _, _)| {
                    !key.starts_with(|c: char| c.is_ascii_digit()) && folded.contains(key)
                })
            })
            .map(|&(_, lat, lng)| geo_types::Point::new(lng, lat))
    }
}

impl Geocoder for DistrictGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<geo_types::Point>, ProviderError> {
        let Some(centre) = Self::district_centre(address) else {
            return Ok(None);
        };

        let mut rng = self.rng.lock();
        let lng = centre.x() + (rng.random::<f64>() - 0.5) * 2.0 * JITTER_DEGREES;
        let lat = centre.y() + (rng.random::<f64>() - 0.5) * 2.0 * JITTER_DEGREES;

        Ok(Some(geo_types::Point::new(lng, lat)))
    }
}

fn fold_diacritics(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            DIACRITIC_FOLDS
                .iter()
                .find(|(variants, _)| variants.contains(c))
                .map_or(c, |&(_, base)| base)
        })
        .collect()
}

/// Digits following the leftmost district prefix, e.g. `"q.10"` -> `"10"`.
fn district_number(folded: &str) -> Option<&str> {
    for (start, _) in folded.char_indices() {
        let rest = &folded[start..];

        for prefix in DISTRICT_PREFIXES {
            let Some(after) = rest.strip_prefix(prefix) else {
                continue;
            };

            let after = after.trim_start();
            let digits = after
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after.len());

            if digits > 0 {
                return Some(&after[..digits]);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_diacritics() {
        assert_eq!(fold_diacritics("Quận Bình Thạnh"), "quan binh thanh");
        assert_eq!(fold_diacritics("Đống Đa"), "dong da");
    }

    #[test]
    fn test_district_number() {
        assert_eq!(district_number("123 le loi quan 1"), Some("1"));
        assert_eq!(district_number("45 tran hung dao, q.5"), Some("5"));
        assert_eq!(district_number("12 district 10, hcm"), Some("10"));
        assert_eq!(district_number("q10"), Some("10"));
        assert_eq!(district_number("quang trung"), None);
    }

    #[test]
    fn test_district_centre_by_number() {
        let point =
            DistrictGeocoder::district_centre("321 Cách Mạng Tháng 8, Quận 10").unwrap();

        assert_eq!(point.y(), 10.7746);
        assert_eq!(point.x(), 106.6669);
    }

    #[test]
    fn test_district_centre_by_name() {
        let point =
            DistrictGeocoder::district_centre("987 Phạm Văn Đồng, Thủ Đức").unwrap();

        assert_eq!(point.y(), 10.8494);
        assert_eq!(point.x(), 106.7537);
    }

    #[test]
    fn test_unknown_district_number_falls_back_to_name() {
        let point = DistrictGeocoder::district_centre("159 Xa Lo Ha Noi, Quan 2, Binh Thanh")
            .unwrap();

        assert_eq!(point.y(), 10.8106);
    }

    #[test]
    fn test_no_district() {
        assert_eq!(DistrictGeocoder::district_centre("somewhere else"), None);
    }

    #[tokio::test]
    async fn test_geocode_is_jittered_within_box() {
        let geocoder = DistrictGeocoder::with_seed(7);
        let point = geocoder.geocode("Quận 1").await.unwrap().unwrap();

        assert!((point.y() - 10.7756).abs() <= JITTER_DEGREES);
        assert!((point.x() - 106.7004).abs() <= JITTER_DEGREES);
    }
}
