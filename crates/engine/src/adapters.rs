// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collaborator bundle handed to the broker

use ces_adapters::{
    IdentityResolver, LivenessMonitor, NoOpIdentityResolver, NoOpLivenessMonitor,
    NoOpStaticSubscriberAdapter, StaticSubscriberAdapter, TelemetrySink, TracedIdentityResolver,
    TracedStaticSubscriberAdapter, TracingTelemetry,
};

/// Trait bundling the external collaborators the broker talks to
pub trait BrokerAdapters: Clone + Send + Sync + 'static {
    type Identity: IdentityResolver;
    type Telemetry: TelemetrySink;
    type StaticSubscribers: StaticSubscriberAdapter;
    type Liveness: LivenessMonitor;

    fn identity(&self) -> &Self::Identity;
    fn telemetry(&self) -> &Self::Telemetry;
    fn static_subscribers(&self) -> &Self::StaticSubscribers;
    fn liveness(&self) -> &Self::Liveness;
}

/// Broker collaborator dependencies
#[derive(Clone)]
pub struct BrokerDeps<I, T, S, L> {
    pub identity: I,
    pub telemetry: T,
    pub static_subscribers: S,
    pub liveness: L,
}

impl<I, T, S, L> BrokerAdapters for BrokerDeps<I, T, S, L>
where
    I: IdentityResolver,
    T: TelemetrySink,
    S: StaticSubscriberAdapter,
    L: LivenessMonitor,
{
    type Identity = I;
    type Telemetry = T;
    type StaticSubscribers = S;
    type Liveness = L;

    fn identity(&self) -> &I {
        &self.identity
    }

    fn telemetry(&self) -> &T {
        &self.telemetry
    }

    fn static_subscribers(&self) -> &S {
        &self.static_subscribers
    }

    fn liveness(&self) -> &L {
        &self.liveness
    }
}

/// Standalone collaborators: deny-all identity, telemetry through `tracing`
pub type StandaloneDeps = BrokerDeps<
    TracedIdentityResolver<NoOpIdentityResolver>,
    TracingTelemetry,
    TracedStaticSubscriberAdapter<NoOpStaticSubscriberAdapter>,
    NoOpLivenessMonitor,
>;

impl StandaloneDeps {
    pub fn standalone() -> Self {
        Self {
            identity: TracedIdentityResolver::new(NoOpIdentityResolver),
            telemetry: TracingTelemetry,
            static_subscribers: TracedStaticSubscriberAdapter::new(NoOpStaticSubscriberAdapter),
            liveness: NoOpLivenessMonitor,
        }
    }
}
