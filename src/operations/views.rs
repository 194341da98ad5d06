// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Assembly of the nested response views from stored records.

use crate::error::ApiError;
use crate::models::{
    App, AppEnv, AppEnvView, AppMint, AppMintView, AppRef, AppView, Cluster, ClusterView,
};
use crate::storage::{
    AppEnvRepository, AppRepository, ClusterRepository, GraphStore, MintRepository,
};

pub(crate) fn cluster_view(store: &GraphStore, cluster: Cluster) -> Result<ClusterView, ApiError> {
    let mints = MintRepository::new(store).list_by_cluster(&cluster.id)?;
    Ok(ClusterView::new(cluster, mints))
}

pub(crate) fn app_mint_view(store: &GraphStore, app_mint: AppMint) -> Result<AppMintView, ApiError> {
    let mint = MintRepository::new(store).get(&app_mint.mint_id)?;
    Ok(AppMintView {
        id: app_mint.id,
        add_memo: app_mint.add_memo,
        order: app_mint.order,
        mint,
    })
}

pub(crate) fn app_env_view(store: &GraphStore, app: &App, env: AppEnv) -> Result<AppEnvView, ApiError> {
    let cluster = ClusterRepository::new(store).get(&env.cluster_id)?;
    let mints = AppEnvRepository::new(store)
        .mints(&env.id)?
        .into_iter()
        .map(|app_mint| app_mint_view(store, app_mint))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(AppEnvView {
        id: env.id,
        name: env.name,
        created_at: env.created_at,
        updated_at: env.updated_at,
        app: AppRef::from(app),
        cluster,
        mints,
    })
}

pub(crate) fn app_view(store: &GraphStore, app: App) -> Result<AppView, ApiError> {
    let envs = AppEnvRepository::new(store)
        .list_for_app(&app.id)?
        .into_iter()
        .map(|env| app_env_view(store, &app, env))
        .collect::<Result<Vec<_>, _>>()?;
    let users = AppRepository::new(store).members(&app.id)?;
    Ok(AppView::new(app, envs, users))
}
