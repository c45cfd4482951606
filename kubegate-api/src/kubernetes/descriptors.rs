//! Resource descriptor registry
//!
//! Static catalog of every resource kind the gateway serves. Each row carries
//! the API coordinates used to build a dynamic client, the kind's scope, the
//! minimum access level per verb and a starter template. Adding a kind means
//! adding a row here; the dispatcher and access gate never special-case kinds.

use kube::core::ApiResource;
use kubegate_common::{AccessLevel, Verb};
use std::collections::HashMap;

use super::error::{GatewayError, GatewayResult};
use super::templates;
use super::types::{Scope, WorkloadTemplate};

use AccessLevel::{Admin, User};

/// Minimum access level per verb; `None` marks the verb unsupported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    pub list: Option<AccessLevel>,
    pub get: Option<AccessLevel>,
    pub describe: Option<AccessLevel>,
    pub create: Option<AccessLevel>,
    pub update: Option<AccessLevel>,
    pub delete: Option<AccessLevel>,
}

impl AccessPolicy {
    /// Same level for every verb
    pub const fn uniform(level: AccessLevel) -> Self {
        Self::split(level, level)
    }

    /// `read` for list/get/describe, `write` for create/update/delete
    pub const fn split(read: AccessLevel, write: AccessLevel) -> Self {
        Self {
            list: Some(read),
            get: Some(read),
            describe: Some(read),
            create: Some(write),
            update: Some(write),
            delete: Some(write),
        }
    }

    /// Only list/get/describe are available
    pub const fn read_only(read: AccessLevel) -> Self {
        Self {
            list: Some(read),
            get: Some(read),
            describe: Some(read),
            create: None,
            update: None,
            delete: None,
        }
    }

    /// Remove a verb from the policy
    pub const fn without(self, verb: Verb) -> Self {
        match verb {
            Verb::List => Self { list: None, ..self },
            Verb::Get => Self { get: None, ..self },
            Verb::Describe => Self { describe: None, ..self },
            Verb::Create => Self { create: None, ..self },
            Verb::Update => Self { update: None, ..self },
            Verb::Delete => Self { delete: None, ..self },
        }
    }

    /// Override the level for a single verb
    pub const fn with(self, verb: Verb, level: AccessLevel) -> Self {
        match verb {
            Verb::List => Self { list: Some(level), ..self },
            Verb::Get => Self { get: Some(level), ..self },
            Verb::Describe => Self { describe: Some(level), ..self },
            Verb::Create => Self { create: Some(level), ..self },
            Verb::Update => Self { update: Some(level), ..self },
            Verb::Delete => Self { delete: Some(level), ..self },
        }
    }

    pub fn required(&self, verb: Verb) -> Option<AccessLevel> {
        match verb {
            Verb::List => self.list,
            Verb::Get => self.get,
            Verb::Describe => self.describe,
            Verb::Create => self.create,
            Verb::Update => self.update,
            Verb::Delete => self.delete,
        }
    }
}

/// Static definition of one resource kind
#[derive(Debug, Clone, Copy)]
pub struct ResourceDescriptor {
    /// Canonical snake_case name, the registry key
    pub kind: &'static str,
    /// Extra names accepted by lookup
    pub aliases: &'static [&'static str],
    /// API group, empty for the core group
    pub group: &'static str,
    pub version: &'static str,
    /// Kind as the cluster API spells it
    pub api_kind: &'static str,
    pub plural: &'static str,
    pub scope: Scope,
    pub access: AccessPolicy,
    pub template: &'static str,
    pub description: &'static str,
}

impl ResourceDescriptor {
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.to_string()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Coordinates for a kube dynamic API handle
    pub fn api_resource(&self) -> ApiResource {
        ApiResource {
            group: self.group.to_string(),
            version: self.version.to_string(),
            api_version: self.api_version(),
            kind: self.api_kind.to_string(),
            plural: self.plural.to_string(),
        }
    }

    /// Fully qualified resource name as kubectl expects it
    pub fn cli_resource(&self) -> String {
        if self.group.is_empty() {
            self.plural.to_string()
        } else {
            format!("{}.{}", self.plural, self.group)
        }
    }

    pub fn is_namespaced(&self) -> bool {
        self.scope == Scope::Namespaced
    }

    /// Namespace objects are hidden by name rather than by their (absent) namespace
    pub fn is_namespace_kind(&self) -> bool {
        self.group.is_empty() && self.api_kind == "Namespace"
    }

    pub fn supports(&self, verb: Verb) -> bool {
        self.access.required(verb).is_some()
    }

    pub fn template(&self) -> WorkloadTemplate {
        WorkloadTemplate {
            kind: self.kind.to_string(),
            template: self.template.to_string(),
            description: self.description.to_string(),
        }
    }
}

/// Built-in descriptor table
pub static BUILTIN: &[ResourceDescriptor] = &[
    ResourceDescriptor {
        kind: "namespace",
        aliases: &["ns"],
        group: "",
        version: "v1",
        api_kind: "Namespace",
        plural: "namespaces",
        scope: Scope::ClusterScoped,
        access: AccessPolicy::split(User, User)
            .without(Verb::Update)
            .with(Verb::Delete, Admin),
        template: templates::NAMESPACE,
        description: "A Namespace partitions a cluster into virtual sub-clusters. Names of resources must be unique within a namespace, and quotas and policies are usually applied per namespace.",
    },
    ResourceDescriptor {
        kind: "pod",
        aliases: &["po"],
        group: "",
        version: "v1",
        api_kind: "Pod",
        plural: "pods",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(User),
        template: templates::POD,
        description: "A Pod is the smallest deployable unit: one or more containers sharing network and storage. This example runs a single nginx container exposing port 80.",
    },
    ResourceDescriptor {
        kind: "deployment",
        aliases: &["deploy"],
        group: "apps",
        version: "v1",
        api_kind: "Deployment",
        plural: "deployments",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(User),
        template: templates::DEPLOYMENT,
        description: "A Deployment declares the desired state of a set of identical pods and rolls changes out gradually. This example keeps two nginx replicas running.",
    },
    ResourceDescriptor {
        kind: "service",
        aliases: &["svc"],
        group: "",
        version: "v1",
        api_kind: "Service",
        plural: "services",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(User),
        template: templates::SERVICE,
        description: "A Service exposes a set of pods behind a stable virtual IP and DNS name. This example routes TCP port 80 to pods labelled app=my-app.",
    },
    ResourceDescriptor {
        kind: "ingress",
        aliases: &["ing"],
        group: "networking.k8s.io",
        version: "v1",
        api_kind: "Ingress",
        plural: "ingresses",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(User),
        template: templates::INGRESS,
        description: "An Ingress routes external HTTP(S) traffic to services based on host and path. This example sends all traffic for example.com to my-service.",
    },
    ResourceDescriptor {
        kind: "configmap",
        aliases: &["cm", "config_map"],
        group: "",
        version: "v1",
        api_kind: "ConfigMap",
        plural: "configmaps",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(User),
        template: templates::CONFIGMAP,
        description: "A ConfigMap stores non-confidential key-value configuration that pods consume as environment variables, arguments or files.",
    },
    ResourceDescriptor {
        kind: "secret",
        aliases: &[],
        group: "",
        version: "v1",
        api_kind: "Secret",
        plural: "secrets",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(Admin),
        template: templates::SECRET,
        description: "A Secret holds a small amount of sensitive data such as passwords or tokens. Values under stringData are encoded by the API server on write.",
    },
    ResourceDescriptor {
        kind: "node",
        aliases: &["no"],
        group: "",
        version: "v1",
        api_kind: "Node",
        plural: "nodes",
        scope: Scope::ClusterScoped,
        access: AccessPolicy::read_only(User),
        template: templates::NODE,
        description: "A Node is a worker machine registered with the cluster. Nodes are registered by the kubelet and can only be inspected here.",
    },
    ResourceDescriptor {
        kind: "daemon_set",
        aliases: &["ds"],
        group: "apps",
        version: "v1",
        api_kind: "DaemonSet",
        plural: "daemonsets",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(User),
        template: templates::DAEMON_SET,
        description: "A DaemonSet runs a copy of a pod on every (or every selected) node, typically for log shippers, monitoring agents or network plugins.",
    },
    ResourceDescriptor {
        kind: "stateful_set",
        aliases: &["sts"],
        group: "apps",
        version: "v1",
        api_kind: "StatefulSet",
        plural: "statefulsets",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(User),
        template: templates::STATEFUL_SET,
        description: "A StatefulSet manages pods with stable identities and per-pod persistent storage. This example runs one postgres replica with a 1Gi volume claim.",
    },
    ResourceDescriptor {
        kind: "job",
        aliases: &[],
        group: "batch",
        version: "v1",
        api_kind: "Job",
        plural: "jobs",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(User),
        template: templates::JOB,
        description: "A Job runs pods until a specified number of them complete successfully. This example computes pi to 200 places and retries up to four times.",
    },
    ResourceDescriptor {
        kind: "cron_job",
        aliases: &["cj"],
        group: "batch",
        version: "v1",
        api_kind: "CronJob",
        plural: "cronjobs",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(User),
        template: templates::CRON_JOB,
        description: "A CronJob creates Jobs on a repeating schedule written in cron format. This example prints the date every five minutes.",
    },
    ResourceDescriptor {
        kind: "replica_set",
        aliases: &["rs"],
        group: "apps",
        version: "v1",
        api_kind: "ReplicaSet",
        plural: "replicasets",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(User),
        template: templates::REPLICA_SET,
        description: "A ReplicaSet keeps a fixed number of pod replicas running. It is usually managed through a Deployment rather than directly.",
    },
    ResourceDescriptor {
        kind: "persistent_volume",
        aliases: &["pv"],
        group: "",
        version: "v1",
        api_kind: "PersistentVolume",
        plural: "persistentvolumes",
        scope: Scope::ClusterScoped,
        access: AccessPolicy::uniform(Admin),
        template: templates::PERSISTENT_VOLUME,
        description: "A PersistentVolume is a piece of cluster storage provisioned by an administrator or a storage class. This example exposes a 5Gi host path.",
    },
    ResourceDescriptor {
        kind: "persistent_volume_claim",
        aliases: &["pvc"],
        group: "",
        version: "v1",
        api_kind: "PersistentVolumeClaim",
        plural: "persistentvolumeclaims",
        scope: Scope::Namespaced,
        access: AccessPolicy::split(User, Admin),
        template: templates::PERSISTENT_VOLUME_CLAIM,
        description: "A PersistentVolumeClaim requests storage of a given size and access mode. The cluster binds it to a matching PersistentVolume.",
    },
    ResourceDescriptor {
        kind: "horizontal_pod_autoscaler",
        aliases: &["hpa"],
        group: "autoscaling",
        version: "v2",
        api_kind: "HorizontalPodAutoscaler",
        plural: "horizontalpodautoscalers",
        scope: Scope::Namespaced,
        access: AccessPolicy::split(User, Admin),
        template: templates::HORIZONTAL_POD_AUTOSCALER,
        description: "A HorizontalPodAutoscaler scales a workload's replica count based on observed metrics. This example keeps average CPU utilization near 80%.",
    },
    ResourceDescriptor {
        kind: "event",
        aliases: &["ev"],
        group: "",
        version: "v1",
        api_kind: "Event",
        plural: "events",
        scope: Scope::Namespaced,
        access: AccessPolicy::read_only(User),
        template: templates::EVENT,
        description: "An Event records something that happened to an object, such as a container start or a scheduling failure. Events are emitted by cluster components.",
    },
    ResourceDescriptor {
        kind: "certificate",
        aliases: &["cert"],
        group: "cert-manager.io",
        version: "v1",
        api_kind: "Certificate",
        plural: "certificates",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(User),
        template: templates::CERTIFICATE,
        description: "A cert-manager Certificate describes a desired X.509 certificate. cert-manager obtains it from the referenced issuer and stores it in the named secret.",
    },
    ResourceDescriptor {
        kind: "certificate_request",
        aliases: &["cr"],
        group: "cert-manager.io",
        version: "v1",
        api_kind: "CertificateRequest",
        plural: "certificaterequests",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(User),
        template: templates::CERTIFICATE_REQUEST,
        description: "A cert-manager CertificateRequest submits a single PEM-encoded CSR to an issuer. Certificates create these automatically.",
    },
    ResourceDescriptor {
        kind: "order",
        aliases: &[],
        group: "acme.cert-manager.io",
        version: "v1",
        api_kind: "Order",
        plural: "orders",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(User),
        template: templates::ORDER,
        description: "An ACME Order tracks a certificate order against an ACME server such as Let's Encrypt, including its pending challenges.",
    },
    ResourceDescriptor {
        kind: "issuer",
        aliases: &[],
        group: "cert-manager.io",
        version: "v1",
        api_kind: "Issuer",
        plural: "issuers",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(User),
        template: templates::ISSUER,
        description: "A cert-manager Issuer signs certificates for a single namespace. This example issues self-signed certificates.",
    },
    ResourceDescriptor {
        kind: "cluster_issuer",
        aliases: &[],
        group: "cert-manager.io",
        version: "v1",
        api_kind: "ClusterIssuer",
        plural: "clusterissuers",
        scope: Scope::ClusterScoped,
        access: AccessPolicy::uniform(Admin),
        template: templates::CLUSTER_ISSUER,
        description: "A cert-manager ClusterIssuer signs certificates for every namespace. This example uses the Let's Encrypt staging ACME endpoint with HTTP-01 challenges.",
    },
    ResourceDescriptor {
        kind: "service_account",
        aliases: &["sa"],
        group: "",
        version: "v1",
        api_kind: "ServiceAccount",
        plural: "serviceaccounts",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(Admin),
        template: templates::SERVICE_ACCOUNT,
        description: "A ServiceAccount provides an identity for processes running in pods, used when they talk to the API server.",
    },
    ResourceDescriptor {
        kind: "role",
        aliases: &[],
        group: "rbac.authorization.k8s.io",
        version: "v1",
        api_kind: "Role",
        plural: "roles",
        scope: Scope::Namespaced,
        access: AccessPolicy::split(User, Admin),
        template: templates::ROLE,
        description: "A Role grants a set of permissions within one namespace. This example allows reading pods.",
    },
    ResourceDescriptor {
        kind: "role_binding",
        aliases: &[],
        group: "rbac.authorization.k8s.io",
        version: "v1",
        api_kind: "RoleBinding",
        plural: "rolebindings",
        scope: Scope::Namespaced,
        access: AccessPolicy::split(User, Admin),
        template: templates::ROLE_BINDING,
        description: "A RoleBinding grants the permissions of a Role to users, groups or service accounts within a namespace.",
    },
    ResourceDescriptor {
        kind: "cluster_role",
        aliases: &[],
        group: "rbac.authorization.k8s.io",
        version: "v1",
        api_kind: "ClusterRole",
        plural: "clusterroles",
        scope: Scope::ClusterScoped,
        access: AccessPolicy::uniform(Admin),
        template: templates::CLUSTER_ROLE,
        description: "A ClusterRole grants permissions cluster-wide or on cluster-scoped resources. This example allows reading secrets in every namespace.",
    },
    ResourceDescriptor {
        kind: "cluster_role_binding",
        aliases: &[],
        group: "rbac.authorization.k8s.io",
        version: "v1",
        api_kind: "ClusterRoleBinding",
        plural: "clusterrolebindings",
        scope: Scope::ClusterScoped,
        access: AccessPolicy::uniform(Admin),
        template: templates::CLUSTER_ROLE_BINDING,
        description: "A ClusterRoleBinding grants the permissions of a ClusterRole across the whole cluster.",
    },
    ResourceDescriptor {
        kind: "volume_attachment",
        aliases: &[],
        group: "storage.k8s.io",
        version: "v1",
        api_kind: "VolumeAttachment",
        plural: "volumeattachments",
        scope: Scope::ClusterScoped,
        access: AccessPolicy::uniform(Admin),
        template: templates::VOLUME_ATTACHMENT,
        description: "A VolumeAttachment captures the intent to attach a volume to a node. It is normally created by the attach/detach controller for CSI drivers.",
    },
    ResourceDescriptor {
        kind: "network_policy",
        aliases: &["netpol"],
        group: "networking.k8s.io",
        version: "v1",
        api_kind: "NetworkPolicy",
        plural: "networkpolicies",
        scope: Scope::Namespaced,
        access: AccessPolicy::split(User, Admin),
        template: templates::NETWORK_POLICY,
        description: "A NetworkPolicy controls which pods may talk to each other. This example only lets frontend pods reach backend pods on port 8080.",
    },
    ResourceDescriptor {
        kind: "storage_class",
        aliases: &["sc"],
        group: "storage.k8s.io",
        version: "v1",
        api_kind: "StorageClass",
        plural: "storageclasses",
        scope: Scope::ClusterScoped,
        access: AccessPolicy::split(User, Admin),
        template: templates::STORAGE_CLASS,
        description: "A StorageClass describes a class of storage and the provisioner that creates volumes for it.",
    },
    ResourceDescriptor {
        kind: "custom_resource_definition",
        aliases: &["crd", "crds"],
        group: "apiextensions.k8s.io",
        version: "v1",
        api_kind: "CustomResourceDefinition",
        plural: "customresourcedefinitions",
        scope: Scope::ClusterScoped,
        access: AccessPolicy::uniform(Admin),
        template: templates::CUSTOM_RESOURCE_DEFINITION,
        description: "A CustomResourceDefinition extends the API with a new resource type. This example registers a namespaced CronTab kind.",
    },
    ResourceDescriptor {
        kind: "endpoints",
        aliases: &["ep", "endpoint"],
        group: "",
        version: "v1",
        api_kind: "Endpoints",
        plural: "endpoints",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(User),
        template: templates::ENDPOINTS,
        description: "An Endpoints object lists the network addresses backing a service. It is maintained automatically for services with selectors.",
    },
    ResourceDescriptor {
        kind: "lease",
        aliases: &[],
        group: "coordination.k8s.io",
        version: "v1",
        api_kind: "Lease",
        plural: "leases",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(User),
        template: templates::LEASE,
        description: "A Lease is a lightweight lock used for leader election and node heartbeats.",
    },
    ResourceDescriptor {
        kind: "priority_class",
        aliases: &["pc"],
        group: "scheduling.k8s.io",
        version: "v1",
        api_kind: "PriorityClass",
        plural: "priorityclasses",
        scope: Scope::ClusterScoped,
        access: AccessPolicy::uniform(Admin),
        template: templates::PRIORITY_CLASS,
        description: "A PriorityClass maps a name to a scheduling priority. Pods referencing a higher priority can preempt lower-priority pods.",
    },
    ResourceDescriptor {
        kind: "volume_snapshot",
        aliases: &["vs"],
        group: "snapshot.storage.k8s.io",
        version: "v1",
        api_kind: "VolumeSnapshot",
        plural: "volumesnapshots",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(User).without(Verb::Update),
        template: templates::VOLUME_SNAPSHOT,
        description: "A VolumeSnapshot is a point-in-time copy of a PersistentVolumeClaim. This example snapshots pvc-test using the class snapshot-class, which is defined by your storage provider.",
    },
    ResourceDescriptor {
        kind: "resource_quota",
        aliases: &["quota"],
        group: "",
        version: "v1",
        api_kind: "ResourceQuota",
        plural: "resourcequotas",
        scope: Scope::Namespaced,
        access: AccessPolicy::uniform(Admin),
        template: templates::RESOURCE_QUOTA,
        description: "A ResourceQuota limits aggregate resource consumption per namespace. This example caps the namespace at 10 pods, 1 CPU and 1Gi requested, 2 CPUs and 2Gi limits.",
    },
];

fn normalize_kind(kind: &str) -> String {
    kind.trim().to_ascii_lowercase().replace('-', "_")
}

/// Lookup structure over a descriptor table
#[derive(Debug)]
pub struct DescriptorRegistry {
    descriptors: &'static [ResourceDescriptor],
    index: HashMap<String, usize>,
}

impl DescriptorRegistry {
    /// Registry over the built-in table
    pub fn builtin() -> GatewayResult<Self> {
        Self::from_table(BUILTIN)
    }

    /// Index a table; rejects names that would resolve to two different kinds
    pub fn from_table(descriptors: &'static [ResourceDescriptor]) -> GatewayResult<Self> {
        let mut index: HashMap<String, usize> = HashMap::new();

        for (position, descriptor) in descriptors.iter().enumerate() {
            let names = std::iter::once(descriptor.kind)
                .chain(descriptor.aliases.iter().copied())
                .chain([descriptor.api_kind, descriptor.plural]);

            for name in names {
                let key = normalize_kind(name);
                if let Some(existing) = index.insert(key.clone(), position) {
                    if existing != position {
                        return Err(GatewayError::ValidationFailure(format!(
                            "name '{}' maps to both {} and {}",
                            key, descriptors[existing].kind, descriptor.kind
                        )));
                    }
                }
            }
        }

        Ok(Self { descriptors, index })
    }

    /// Find the descriptor for a kind name, plural or alias
    pub fn lookup(&self, kind: &str) -> GatewayResult<&ResourceDescriptor> {
        self.index
            .get(&normalize_kind(kind))
            .map(|&position| &self.descriptors[position])
            .ok_or_else(|| GatewayError::UnsupportedKind(kind.to_string()))
    }

    /// Kinds a caller at `level` may list and get, in table order
    pub fn list_supported_kinds(&self, level: AccessLevel) -> Vec<&'static str> {
        self.descriptors
            .iter()
            .filter(|d| {
                let visible = |verb| d.access.required(verb).is_some_and(|req| req <= level);
                visible(Verb::List) && visible(Verb::Get)
            })
            .map(|d| d.kind)
            .collect()
    }

    /// Starter templates in table order
    pub fn templates(&self) -> Vec<WorkloadTemplate> {
        self.descriptors.iter().map(ResourceDescriptor::template).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static ResourceDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
