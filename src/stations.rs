/// Station list management and name resolution.
///
/// The backend device list is the single source of truth; this module owns
/// the in-memory copy of it. The list is only ever replaced wholesale (one
/// refresh = one new list), re-sorted into a stable id order so the cycle
/// visits stations deterministically regardless of backend response order.
///
/// Name resolution lives here too: panels occasionally hand us a station
/// *name* rather than an index (legend clicks, ticker taps), and the names
/// they carry are not always byte-identical to the device list's.

use crate::model::{Coordinates, Station};

// ---------------------------------------------------------------------------
// Station list
// ---------------------------------------------------------------------------

/// Owning wrapper around the current station list.
///
/// Invariant: stations are always sorted by ascending id.
#[derive(Debug, Default)]
pub struct StationList {
    stations: Vec<Station>,
}

impl StationList {
    pub fn new() -> Self {
        StationList { stations: Vec::new() }
    }

    /// Replaces the entire list with a fresh fetch result and restores the
    /// stable id ordering. Never merges with the previous list.
    pub fn replace(&mut self, mut stations: Vec<Station>) {
        stations.sort_by(|a, b| a.id.cmp(&b.id));
        self.stations = stations;
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Station> {
        self.stations.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Station> {
        self.stations.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    /// Clamps an index into the current list range. Returns 0 for an empty
    /// list so callers keep a well-defined cursor across refreshes.
    pub fn clamp_index(&self, index: usize) -> usize {
        if self.stations.is_empty() {
            0
        } else {
            index.min(self.stations.len() - 1)
        }
    }

    // -----------------------------------------------------------------------
    // Name resolution
    // -----------------------------------------------------------------------

    /// Resolves a station name to its entry, trying progressively looser
    /// matches:
    ///
    ///   1. exact name match
    ///   2. case-insensitive match
    ///   3. substring containment, both directions
    ///
    /// When the fuzzy pass matches several stations, the shortest matching
    /// name wins (the most specific containment), ties broken by id order.
    pub fn find_by_name(&self, name: &str) -> Option<&Station> {
        if name.is_empty() {
            return None;
        }

        if let Some(station) = self.stations.iter().find(|s| s.name == name) {
            return Some(station);
        }

        let lowered = name.to_lowercase();
        if let Some(station) = self
            .stations
            .iter()
            .find(|s| s.name.to_lowercase() == lowered)
        {
            return Some(station);
        }

        // List is id-sorted, so min_by_key keeps the first (lowest id) among
        // equal-length candidates.
        self.stations
            .iter()
            .filter(|s| {
                let candidate = s.name.to_lowercase();
                candidate.contains(&lowered) || lowered.contains(&candidate)
            })
            .min_by_key(|s| s.name.len())
    }

    /// Resolves a station name directly to coordinates. Stations that match
    /// by name but carry no coordinates yield `None`, like an unmatched name.
    pub fn coordinates_for_name(&self, name: &str) -> Option<Coordinates> {
        self.find_by_name(name).and_then(|s| s.coordinates)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{StationStatus, DEFAULT_UNIT};

    fn station(id: &str, name: &str, lon: f64, lat: f64) -> Station {
        Station {
            id: id.to_string(),
            name: name.to_string(),
            coordinates: Some(Coordinates::new(lon, lat)),
            value: None,
            unit: DEFAULT_UNIT.to_string(),
            status: StationStatus::Unknown,
            thresholds: None,
            history: Vec::new(),
        }
    }

    fn sample_list() -> StationList {
        let mut list = StationList::new();
        list.replace(vec![
            station("03", "Depok", 106.83, -6.40),
            station("01", "Katulampa", 106.84, -6.63),
            station("02", "Manggarai BKB", 106.85, -6.21),
        ]);
        list
    }

    #[test]
    fn test_replace_sorts_by_id() {
        let list = sample_list();
        let ids: Vec<_> = list.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["01", "02", "03"]);
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut list = sample_list();
        list.replace(vec![station("09", "Angke Hulu", 106.73, -6.34)]);
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0).unwrap().name, "Angke Hulu");
    }

    #[test]
    fn test_clamp_index_in_range_and_empty() {
        let mut list = sample_list();
        assert_eq!(list.clamp_index(1), 1);
        assert_eq!(list.clamp_index(99), 2);
        list.replace(Vec::new());
        assert_eq!(list.clamp_index(99), 0);
    }

    #[test]
    fn test_find_by_name_exact() {
        let list = sample_list();
        assert_eq!(list.find_by_name("Katulampa").unwrap().id, "01");
    }

    #[test]
    fn test_find_by_name_case_insensitive() {
        let list = sample_list();
        assert_eq!(list.find_by_name("katulampa").unwrap().id, "01");
        assert_eq!(list.find_by_name("MANGGARAI bkb").unwrap().id, "02");
    }

    #[test]
    fn test_find_by_name_substring_both_ways() {
        let list = sample_list();
        // Query contained in station name.
        assert_eq!(list.find_by_name("Manggarai").unwrap().id, "02");
        // Station name contained in query.
        assert_eq!(list.find_by_name("Pos Depok Hilir").unwrap().id, "03");
    }

    #[test]
    fn test_fuzzy_prefers_shortest_matching_name() {
        let mut list = StationList::new();
        list.replace(vec![
            station("01", "Cipinang Hulu", 106.9, -6.3),
            station("02", "Cipinang", 106.9, -6.2),
        ]);
        // Both names contain "cipinang"; the shorter (more specific
        // containment) must win.
        assert_eq!(list.find_by_name("cipinang").unwrap().id, "02");
    }

    #[test]
    fn test_fuzzy_tie_breaks_by_id_order() {
        let mut list = StationList::new();
        list.replace(vec![
            station("07", "Sunter Hulu", 106.9, -6.3),
            station("04", "Sunter Hili", 106.9, -6.2), // same length
        ]);
        assert_eq!(list.find_by_name("sunter").unwrap().id, "04");
    }

    #[test]
    fn test_find_by_name_no_match_returns_none() {
        let list = sample_list();
        assert!(list.find_by_name("Bendung Gerak").is_none());
        assert!(list.find_by_name("").is_none());
    }

    #[test]
    fn test_coordinates_for_name_skips_stations_without_coordinates() {
        let mut list = StationList::new();
        let mut no_coords = station("01", "Katulampa", 0.0, 0.0);
        no_coords.coordinates = None;
        list.replace(vec![no_coords]);
        assert!(list.find_by_name("Katulampa").is_some());
        assert!(list.coordinates_for_name("Katulampa").is_none());
    }
}
