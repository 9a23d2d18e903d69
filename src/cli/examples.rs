//! Help examples shared by canonical commands and their aliases
//!
//! Examples are written once against the canonical form
//! (`stevedore bundle install`). The alias form (`stevedore install`) gets
//! the same text with only the command prefix replaced, so flags read
//! identically in both.

/// Example text for one command
pub struct Examples {
    canonical: &'static str,
    alias: &'static str,
    text: &'static str,
}

impl Examples {
    /// Help text for the canonical command
    pub fn canonical(&self) -> String {
        self.text.to_string()
    }

    /// Help text for the alias: the canonical prefix replaced, nothing else
    pub fn alias(&self) -> String {
        self.text.replace(self.canonical, self.alias)
    }
}

pub const CREATE: Examples = Examples {
    canonical: "stevedore bundle create",
    alias: "stevedore create",
    text: "EXAMPLES:\n  \
           Start a bundle in the current directory:\n    stevedore bundle create example\n\n  \
           Start a bundle in another directory:\n    stevedore bundle create example --dir ./example",
};

pub const BUILD: Examples = Examples {
    canonical: "stevedore bundle build",
    alias: "stevedore build",
    text: "EXAMPLES:\n  \
           Build the invocation image of ./bundle.json:\n    stevedore bundle build\n\n  \
           Build another bundle:\n    stevedore bundle build --file ./example/bundle.json",
};

pub const INSTALL: Examples = Examples {
    canonical: "stevedore bundle install",
    alias: "stevedore install",
    text: "EXAMPLES:\n  \
           Install ./bundle.json under the bundle's name:\n    stevedore bundle install\n\n  \
           Install a tag, loading it from a file the first time:\n    \
           stevedore bundle install example --tag example:v1 --file ./bundle.json --cred ci\n\n  \
           Set parameters:\n    \
           stevedore bundle install example --tag example:v1 --param region=eu-north-1\n\n  \
           Build the invocation image first if it is missing:\n    \
           stevedore bundle install --file ./bundle.json --build",
};

pub const UPGRADE: Examples = Examples {
    canonical: "stevedore bundle upgrade",
    alias: "stevedore upgrade",
    text: "EXAMPLES:\n  \
           Upgrade with the bundle recorded at install time:\n    stevedore bundle upgrade example --cred ci\n\n  \
           Upgrade to a newer tag:\n    \
           stevedore bundle upgrade example --tag example:v2 --file ./bundle.json --cred ci",
};

pub const INVOKE: Examples = Examples {
    canonical: "stevedore bundle invoke",
    alias: "stevedore invoke",
    text: "EXAMPLES:\n  \
           Run the bundle's custom 'logs' action:\n    stevedore bundle invoke example --action logs --cred ci\n\n  \
           Give the action at most five minutes:\n    \
           stevedore bundle invoke example --action backup --timeout 300",
};

pub const UNINSTALL: Examples = Examples {
    canonical: "stevedore bundle uninstall",
    alias: "stevedore uninstall",
    text: "EXAMPLES:\n  \
           Uninstall an installation:\n    stevedore bundle uninstall example --cred ci",
};

pub const ARCHIVE: Examples = Examples {
    canonical: "stevedore bundle archive",
    alias: "stevedore archive",
    text: "EXAMPLES:\n  \
           Export a cached tag with a digest sidecar:\n    \
           stevedore bundle archive example-v1.json --tag example:v1\n\n  \
           Export a local bundle file:\n    stevedore bundle archive out.json --file ./bundle.json",
};

pub const LIST: Examples = Examples {
    canonical: "stevedore instances list",
    alias: "stevedore list",
    text: "EXAMPLES:\n  \
           List installations:\n    stevedore instances list\n\n  \
           As JSON:\n    stevedore instances list --json",
};

pub const SHOW: Examples = Examples {
    canonical: "stevedore instance show",
    alias: "stevedore show",
    text: "EXAMPLES:\n  \
           Show an installation:\n    stevedore instance show example\n\n  \
           Include every recorded revision:\n    stevedore instance show example --history",
};
