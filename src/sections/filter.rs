use super::{compare_terms, EnsembleSection};
use serde::Serialize;
use std::collections::BTreeSet;

/// Selection criteria for the sections a report covers.
///
/// Every field is optional; an empty filter keeps every section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SectionFilter {
    pub term: Option<String>,
    pub style: Option<String>,
    pub rating: Option<u32>,
    /// Keep only sections that list every one of these instrument codes as
    /// needed.
    pub instrument_needs: Vec<String>,
    /// Case-insensitive match on section name, faculty or course title.
    pub search: Option<String>,
}

impl SectionFilter {
    pub fn matches(&self, section: &EnsembleSection) -> bool {
        if let Some(term) = &self.term {
            if &section.term != term {
                return false;
            }
        }
        if let Some(style) = &self.style {
            if section.style.as_deref() != Some(style.as_str()) {
                return false;
            }
        }
        if let Some(rating) = self.rating {
            if section.rating != Some(rating) {
                return false;
            }
        }
        if !self
            .instrument_needs
            .iter()
            .all(|code| section.needs_instrument(code))
        {
            return false;
        }
        if let Some(query) = &self.search {
            let query = query.trim().to_lowercase();
            if !query.is_empty() && !matches_search(section, &query) {
                return false;
            }
        }
        true
    }

    /// Keeps matching sections, preserving input order.
    pub fn apply<'a>(&self, sections: &'a [EnsembleSection]) -> Vec<&'a EnsembleSection> {
        sections.iter().filter(|s| self.matches(s)).collect()
    }
}

fn matches_search(section: &EnsembleSection, query: &str) -> bool {
    section.section_name.to_lowercase().contains(query)
        || section
            .faculty
            .iter()
            .any(|name| name.to_lowercase().contains(query))
        || section
            .course_title
            .as_deref()
            .is_some_and(|title| title.to_lowercase().contains(query))
}

/// Distinct term codes, oldest first.
pub fn available_terms(sections: &[EnsembleSection]) -> Vec<String> {
    let mut terms: Vec<String> = sections
        .iter()
        .map(|s| s.term.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    terms.sort_by(|a, b| compare_terms(a, b));
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_section(term: &str, name: &str) -> EnsembleSection {
        EnsembleSection {
            term: term.to_string(),
            section_name: name.to_string(),
            seats_capacity: 8,
            seats_available: 4,
            active_student_count: 4,
            ..Default::default()
        }
    }

    fn sample() -> Vec<EnsembleSection> {
        let mut a = make_section("2024FA", "ENS-101-01");
        a.style = Some("Jazz".to_string());
        a.rating = Some(3);
        a.faculty = vec!["Ana Ruiz".to_string()];
        a.instruments_needed = vec!["BASS".to_string()];

        let mut b = make_section("2024FA", "ENS-202-01");
        b.style = Some("Rock".to_string());
        b.course_title = Some("Rock Lab".to_string());

        let c = make_section("2024SP", "ENS-101-02");
        vec![a, b, c]
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let sections = sample();
        let filter = SectionFilter::default();
        assert_eq!(filter.apply(&sections).len(), 3);
    }

    #[test]
    fn test_filter_by_term_and_style() {
        let sections = sample();
        let filter = SectionFilter {
            term: Some("2024FA".to_string()),
            style: Some("Rock".to_string()),
            ..Default::default()
        };
        let kept = filter.apply(&sections);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].section_name, "ENS-202-01");
    }

    #[test]
    fn test_filter_by_rating_and_instrument_need() {
        let sections = sample();
        let filter = SectionFilter {
            rating: Some(3),
            instrument_needs: vec!["BASS".to_string()],
            ..Default::default()
        };
        let kept = filter.apply(&sections);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].section_name, "ENS-101-01");
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let sections = sample();
        let by_faculty = SectionFilter {
            search: Some("ruiz".to_string()),
            ..Default::default()
        };
        assert_eq!(by_faculty.apply(&sections).len(), 1);

        let by_title = SectionFilter {
            search: Some("ROCK LAB".to_string()),
            ..Default::default()
        };
        assert_eq!(by_title.apply(&sections)[0].section_name, "ENS-202-01");

        let by_name = SectionFilter {
            search: Some("ens-101".to_string()),
            ..Default::default()
        };
        assert_eq!(by_name.apply(&sections).len(), 2);
    }

    #[test]
    fn test_every_instrument_need_must_match() {
        let mut sections = sample();
        sections[1].instruments_needed = vec!["BASS".to_string(), "DRUM".to_string()];
        let filter = SectionFilter {
            instrument_needs: vec!["BASS".to_string(), "DRUM".to_string()],
            ..Default::default()
        };
        let kept = filter.apply(&sections);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].section_name, "ENS-202-01");

        let bass_only = SectionFilter {
            instrument_needs: vec!["BASS".to_string()],
            ..Default::default()
        };
        assert_eq!(bass_only.apply(&sections).len(), 2);
    }

    #[test]
    fn test_available_terms_in_chronological_order() {
        let mut sections = sample();
        sections.push(make_section("2023FA", "ENS-300-01"));
        sections.push(make_section("2024SP", "ENS-300-02"));
        assert_eq!(
            available_terms(&sections),
            vec!["2023FA", "2024SP", "2024FA"]
        );
    }
}
