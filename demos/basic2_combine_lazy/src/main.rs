use crate::tracing_setup::tracing_init;
use futures::StreamExt;
use lazyrx::{
    combine_lazy, create_lazy, create_selector, select_lazy, Lazy, LazyError, SelectLazy,
    Selector, State, StateStore, Store,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

mod tracing_setup;

#[derive(Debug, Clone)]
struct Dashboard {
    orders: Lazy<Vec<u64>>,
    revenue: Lazy<u64>,
    region: String,
}

impl State for Dashboard {}

#[derive(Debug, Clone)]
enum Action {
    LoadOrders,
    LoadRevenue,
    SetRegion(String),
}

fn reducer(state: Dashboard, action: &Action) -> Dashboard {
    match action {
        Action::SetRegion(region) => Dashboard {
            region: region.clone(),
            ..state
        },
        // Loads are driven by the store's loaders below.
        Action::LoadOrders | Action::LoadRevenue => state,
    }
}

fn orders() -> Selector<Dashboard, Lazy<Vec<u64>>> {
    create_selector(|state: &Dashboard| state.orders.clone())
}

fn revenue() -> Selector<Dashboard, Lazy<u64>> {
    create_selector(|state: &Dashboard| state.revenue.clone())
}

fn region() -> Selector<Dashboard, String> {
    create_selector(|state: &Dashboard| state.region.clone())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_init();

    let store = StateStore::new(
        Dashboard {
            orders: create_lazy(Vec::new()),
            revenue: create_lazy(0),
            region: "emea".to_string(),
        },
        reducer,
    );

    // Effects that run the loads through the store's loaders.
    let loader = store.clone();
    let _effect = store.register_effect(move |action| {
        match action {
            Action::LoadOrders => loader.async_load(
                |state: &mut Dashboard| &mut state.orders,
                async {
                    sleep(Duration::from_millis(80)).await;
                    Ok::<Vec<u64>, LazyError>(vec![101, 102, 103])
                },
            ),
            Action::LoadRevenue => loader.async_load_with_timeout(
                |state: &mut Dashboard| &mut state.revenue,
                async {
                    sleep(Duration::from_millis(40)).await;
                    4_200u64
                },
                Duration::from_millis(500),
            ),
            Action::SetRegion(_) => {}
        }
        async { None }
    });

    info!("==========================================");
    warn!("example: combine_lazy() emits on every change of either input.");

    let orders_query =
        select_lazy(SelectLazy::new(store.clone(), orders()).load_action(Action::LoadOrders));
    let revenue_query =
        select_lazy(SelectLazy::new(store.clone(), revenue()).load_action(Action::LoadRevenue));
    let dashboard = combine_lazy(&store, (orders_query, revenue_query));

    let mut regions = dashboard.clone().select(&region());

    let mut combined = dashboard;
    while let Some((orders, revenue)) = combined.next().await {
        info!(
            "  Main thread | orders ready: {}, revenue ready: {}",
            orders.is_ready(),
            revenue.is_ready()
        );
        if orders.is_ready() && revenue.is_ready() {
            info!(
                "  Main thread | {} orders, revenue {}",
                orders.data.len(),
                revenue.data
            );
            break;
        }
    }

    info!("==========================================");
    warn!("example: select() switches to a derived selector after one snapshot.");

    if let Some(current) = regions.next().await {
        info!("  Main thread | region: {}", current);
    }
    store.dispatch(Action::SetRegion("apac".to_string()));
    if let Some(current) = regions.next().await {
        info!("  Main thread | region: {}", current);
    }

    Ok(())
}
