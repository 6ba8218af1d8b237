#![allow(dead_code)]

use lazyrx::{create_lazy, create_selector, Lazy, Selector, State, StateStore};
use std::time::Duration;
use tokio::time::sleep;

#[derive(Clone, Debug, PartialEq)]
pub struct CatalogState {
    pub products: Lazy<Vec<String>>,
    pub prices: Lazy<Vec<u32>>,
    pub stock: Lazy<u32>,
    pub authenticated: bool,
    pub banner: String,
}

impl State for CatalogState {}

impl Default for CatalogState {
    fn default() -> Self {
        CatalogState {
            products: create_lazy(Vec::new()),
            prices: create_lazy(Vec::new()),
            stock: create_lazy(0),
            authenticated: false,
            banner: "welcome".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CatalogAction {
    LoadProducts,
    ProductsLoaded(Vec<String>),
    LoadPrices,
    PricesLoaded(Vec<u32>),
    LoadStock,
    StockLoaded(u32),
    LogIn,
    SetBanner(String),
}

pub fn catalog_reducer(state: CatalogState, action: &CatalogAction) -> CatalogState {
    match action {
        CatalogAction::LoadProducts => CatalogState {
            products: state.products.clone().start_loading(),
            ..state
        },
        CatalogAction::ProductsLoaded(products) => CatalogState {
            products: state.products.clone().resolve(products.clone()),
            ..state
        },
        CatalogAction::LoadPrices => CatalogState {
            prices: state.prices.clone().start_loading(),
            ..state
        },
        CatalogAction::PricesLoaded(prices) => CatalogState {
            prices: state.prices.clone().resolve(prices.clone()),
            ..state
        },
        CatalogAction::LoadStock => CatalogState {
            stock: state.stock.start_loading(),
            ..state
        },
        CatalogAction::StockLoaded(stock) => CatalogState {
            stock: state.stock.resolve(*stock),
            ..state
        },
        CatalogAction::LogIn => CatalogState {
            authenticated: true,
            ..state
        },
        CatalogAction::SetBanner(banner) => CatalogState {
            banner: banner.clone(),
            ..state
        },
    }
}

/// A store whose effect answers every load after a short delay.
pub fn catalog_store() -> StateStore<CatalogState, CatalogAction> {
    let store = StateStore::new(CatalogState::default(), catalog_reducer);
    // Detached: the effect lives as long as the store's action bus.
    let _ = store.register_effect(|action| async move {
        sleep(Duration::from_millis(10)).await;
        match action {
            CatalogAction::LoadProducts => Some(CatalogAction::ProductsLoaded(vec![
                "lamp".to_string(),
                "desk".to_string(),
            ])),
            CatalogAction::LoadPrices => Some(CatalogAction::PricesLoaded(vec![30, 120])),
            CatalogAction::LoadStock => Some(CatalogAction::StockLoaded(4)),
            _ => None,
        }
    });
    store
}

pub fn products() -> Selector<CatalogState, Lazy<Vec<String>>> {
    create_selector(|state: &CatalogState| state.products.clone())
}

pub fn prices() -> Selector<CatalogState, Lazy<Vec<u32>>> {
    create_selector(|state: &CatalogState| state.prices.clone())
}

pub fn stock() -> Selector<CatalogState, Lazy<u32>> {
    create_selector(|state: &CatalogState| state.stock.clone())
}

pub fn authenticated() -> Selector<CatalogState, bool> {
    create_selector(|state: &CatalogState| state.authenticated)
}

pub fn banner() -> Selector<CatalogState, String> {
    create_selector(|state: &CatalogState| state.banner.clone())
}
