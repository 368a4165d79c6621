//! Filter state and the per-product filter predicate.
//!
//! Facet groups combine with AND; values inside one group combine with OR.
//! An empty group places no constraint on the product.

use std::collections::BTreeSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::facets::{Availability, FacetSet, OptionKind};

/// Query parameter names, shared with Shopify's own storefront filter URLs.
pub mod params {
    pub const AVAILABILITY: &str = "filter.v.availability";
    pub const COLOR: &str = "filter.v.option.color";
    pub const SIZE: &str = "filter.v.option.size";
    pub const TAG: &str = "filter.p.tag";
    pub const PRICE_MIN: &str = "filter.v.price.gte";
    pub const PRICE_MAX: &str = "filter.v.price.lte";
}

/// Inclusive price range; an unset bound is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceFilter {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl PriceFilter {
    /// Whether `amount` lies in the range. An inverted range contains nothing.
    #[must_use]
    pub fn contains(&self, amount: Decimal) -> bool {
        self.min.is_none_or(|min| amount >= min) && self.max.is_none_or(|max| amount <= max)
    }

    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// The visitor's facet selections.
///
/// Each view owns its own instance; nothing here is shared between pages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    pub availability: BTreeSet<Availability>,
    pub colors: BTreeSet<String>,
    pub sizes: BTreeSet<String>,
    pub tags: BTreeSet<String>,
    pub price: PriceFilter,
}

impl FilterState {
    /// Whether no facet group is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.availability.is_empty()
            && self.colors.is_empty()
            && self.sizes.is_empty()
            && self.tags.is_empty()
            && self.price.is_unbounded()
    }

    /// Number of selected values, counting the price range as one.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.availability.len()
            + self.colors.len()
            + self.sizes.len()
            + self.tags.len()
            + usize::from(!self.price.is_unbounded())
    }

    /// Decide whether a product stays visible.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_availability(product)
            && self.price.contains(product.min_price().amount)
            && matches_option(product, OptionKind::Color, &self.colors)
            && matches_option(product, OptionKind::Size, &self.sizes)
            && self.matches_tags(product)
    }

    /// Products that pass the filter, in input order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }

    fn matches_availability(&self, product: &Product) -> bool {
        if self.availability.is_empty() {
            return true;
        }
        let available = product.is_available();
        self.availability
            .iter()
            .any(|state| state.is_available() == available)
    }

    fn matches_tags(&self, product: &Product) -> bool {
        self.tags.is_empty() || self.tags.iter().any(|tag| product.has_tag(tag))
    }

    /// Drop selections the freshly extracted facets no longer offer.
    ///
    /// Returns `true` if anything was removed. The price range is kept.
    pub fn prune_to(&mut self, facets: &FacetSet) -> bool {
        let before = self.active_count();
        self.colors.retain(|c| facets.has_color(c));
        self.sizes.retain(|s| facets.has_size(s));
        self.tags.retain(|t| facets.has_tag(t));
        self.availability
            .retain(|a| facets.availability.contains_key(a));
        self.active_count() != before
    }

    /// Parse selections from URL query pairs.
    ///
    /// Unknown keys, blank values and unparsable numbers are ignored.
    #[must_use]
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut state = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                params::AVAILABILITY => {
                    if let Ok(availability) = value.parse() {
                        state.availability.insert(availability);
                    }
                }
                params::COLOR => {
                    state.colors.insert(value.to_string());
                }
                params::SIZE => {
                    state.sizes.insert(value.to_string());
                }
                params::TAG => {
                    state.tags.insert(value.to_string());
                }
                params::PRICE_MIN => state.price.min = Decimal::from_str(value).ok(),
                params::PRICE_MAX => state.price.max = Decimal::from_str(value).ok(),
                _ => {}
            }
        }
        state
    }

    /// Serialize selections back to URL query pairs, in a stable order.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(self.active_count() + 1);
        pairs.extend(
            self.availability
                .iter()
                .map(|a| (params::AVAILABILITY, a.as_param().to_string())),
        );
        pairs.extend(self.colors.iter().map(|c| (params::COLOR, c.clone())));
        pairs.extend(self.sizes.iter().map(|s| (params::SIZE, s.clone())));
        pairs.extend(self.tags.iter().map(|t| (params::TAG, t.clone())));
        if let Some(min) = self.price.min {
            pairs.push((params::PRICE_MIN, min.to_string()));
        }
        if let Some(max) = self.price.max {
            pairs.push((params::PRICE_MAX, max.to_string()));
        }
        pairs
    }

    /// Copy with one value toggled in the group named by `param`.
    #[must_use]
    pub fn toggled(&self, param: &str, value: &str) -> Self {
        let mut next = self.clone();
        let toggle = |set: &mut BTreeSet<String>| {
            if !set.remove(value) {
                set.insert(value.to_string());
            }
        };
        match param {
            params::COLOR => toggle(&mut next.colors),
            params::SIZE => toggle(&mut next.sizes),
            params::TAG => toggle(&mut next.tags),
            params::AVAILABILITY => {
                if let Ok(availability) = value.parse::<Availability>()
                    && !next.availability.remove(&availability)
                {
                    next.availability.insert(availability);
                }
            }
            _ => {}
        }
        next
    }
}

/// Any variant carries a selected option of `kind` with a selected value.
///
/// Products fetched without variants fall back to their option list.
fn matches_option(product: &Product, kind: OptionKind, selected: &BTreeSet<String>) -> bool {
    if selected.is_empty() {
        return true;
    }
    let is_selected = |value: &str| {
        let value = value.trim().to_lowercase();
        selected.iter().any(|s| s.trim().to_lowercase() == value)
    };

    if product.variants.is_empty() {
        return product
            .options
            .iter()
            .filter(|option| kind.matches(&option.name))
            .flat_map(|option| option.values())
            .any(is_selected);
    }

    product.variants.iter().any(|variant| {
        variant
            .selected_options
            .iter()
            .any(|o| kind.matches(&o.name) && is_selected(&o.value))
    })
}

/// Committed filter plus an optional draft being edited in the filter panel.
///
/// The committed state drives the rendered results. Opening the panel copies
/// it into a draft; edits touch only the draft until [`FilterPanel::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPanel {
    committed: FilterState,
    draft: Option<FilterState>,
}

impl FilterPanel {
    #[must_use]
    pub const fn new(committed: FilterState) -> Self {
        Self {
            committed,
            draft: None,
        }
    }

    #[must_use]
    pub const fn committed(&self) -> &FilterState {
        &self.committed
    }

    #[must_use]
    pub const fn draft(&self) -> Option<&FilterState> {
        self.draft.as_ref()
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.draft.is_some()
    }

    /// Open the panel, seeding the draft from the committed state.
    pub fn open(&mut self) {
        if self.draft.is_none() {
            self.draft = Some(self.committed.clone());
        }
    }

    /// Mutable draft, opening the panel first if needed.
    pub fn draft_mut(&mut self) -> &mut FilterState {
        self.draft.get_or_insert_with(|| self.committed.clone())
    }

    /// Commit the draft and close the panel.
    pub fn apply(&mut self) -> &FilterState {
        if let Some(draft) = self.draft.take() {
            self.committed = draft;
        }
        &self.committed
    }

    /// Discard the draft and reset the committed state to no filters.
    pub fn clear(&mut self) {
        self.draft = None;
        self.committed = FilterState::default();
    }

    /// Discard the draft, keeping the committed state.
    pub fn cancel(&mut self) {
        self.draft = None;
    }

    /// Number of products the draft (or committed state when closed) shows.
    #[must_use]
    pub fn preview_count(&self, products: &[Product]) -> usize {
        let state = self.draft.as_ref().unwrap_or(&self.committed);
        products.iter().filter(|p| state.matches(p)).count()
    }
}
