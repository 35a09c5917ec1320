//! Sample dependency files in each legacy format.

pub const GODEPS_JSON: &str = r#"{
    "ImportPath": "github.com/me/app",
    "GoVersion": "go1.6",
    "Deps": [
        {
            "ImportPath": "golang.org/x/crypto/bcrypt",
            "Rev": "1f22c0103821b9390939b6776727195525381532"
        },
        {
            "ImportPath": "golang.org/x/crypto/blowfish",
            "Rev": "1f22c0103821b9390939b6776727195525381532"
        },
        {
            "ImportPath": "github.com/kr/fs",
            "Comment": "v0.0.1",
            "Rev": "2788f0dbd16903de03cb8186e5c7d97b69ad387b"
        }
    ]
}
"#;

pub const GPM_GODEPS: &str = "\
# pinned for the 1.x series
github.com/nu7hatch/gotrail               v0.0.2
github.com/replicon/fast-archiver         v1.02

github.com/garyburd/redigo/redis          master
launchpad.net/gocheck
";

pub const GB_MANIFEST: &str = r#"{
    "version": 0,
    "dependencies": [
        {
            "importpath": "github.com/pkg/errors",
            "repository": "https://github.com/pkg/errors",
            "revision": "645ef00459ed84a119197bfb8d8205042c6df63d",
            "branch": "master"
        },
        {
            "importpath": "golang.org/x/net/context",
            "repository": "https://go.googlesource.com/net",
            "revision": "f2499483f923065a842d38eb4c7f1927e6fc6e6d",
            "branch": "master",
            "path": "/context"
        },
        {
            "importpath": "golang.org/x/net/http2",
            "repository": "https://go.googlesource.com/net",
            "revision": "f2499483f923065a842d38eb4c7f1927e6fc6e6d",
            "branch": "master",
            "path": "/http2"
        }
    ]
}
"#;

pub const GOMFILE: &str = "\
gom 'github.com/mattn/go-runewidth', :tag => 'v0.0.1'
gom 'github.com/mattn/go-scan', :commit => 'ecb144fb1f2848a24ebfdadf8e64380406d87206'

group :development do
  gom 'github.com/daviddengcn/go-colortext', :branch => 'master'
end

group :test do
  gom 'github.com/stretchr/testify'
end

# platform specific
gom 'golang.org/x/sys/unix', :goos => [:linux, :darwin], :goarch => 'amd64'
";

pub const TRASH_CONF: &str = "\
# package
github.com/rancher/trash

github.com/Sirupsen/logrus v0.10.0 https://github.com/imikushin/logrus.git
gopkg.in/check.v1 20d25e2804050c1cd24a7eea1e7a6447dd0e74ec   # tests only
github.com/cloudfoundry-incubator/candiedyaml 99c3df8
github.com/Sirupsen/logrus v0.9.0

-vendor/github.com/x/bad
";

pub const TRASH_YAML: &str = "\
package: github.com/me/app

import:
  - package: github.com/c/d
    version: v2.1.0
  - package: github.com/a/b
    version: v1.0.0
    repo: https://github.com/fork/b

exclude:
  - .git
";

pub const VNDR_CONF: &str = "\
# runtime
github.com/Azure/go-ansiterm 19f72df4d05d31cbe1c56bfc8045c96babff6c7e
github.com/Microsoft/hcsshim v0.5.9 # windows only

google.golang.org/grpc v1.0.4 https://github.com/grpc/grpc-go.git
";

pub const GOVENDOR_JSON: &str = r#"{
    "comment": "",
    "ignore": "test",
    "package": [
        {
            "checksumSHA1": "ynJSWoF6v+3zMnh9R0QmmG6iGV8=",
            "path": "github.com/pkg/errors",
            "revision": "645ef00459ed84a119197bfb8d8205042c6df63d",
            "revisionTime": "2016-09-29T01:48:01Z",
            "version": "v0.8.0",
            "versionExact": ""
        },
        {
            "path": "golang.org/x/net/context",
            "revision": "f2499483f923065a842d38eb4c7f1927e6fc6e6d",
            "revisionTime": "2017-01-14T04:22:49Z"
        },
        {
            "path": "golang.org/x/net/http2",
            "revision": "f2499483f923065a842d38eb4c7f1927e6fc6e6d",
            "revisionTime": "2017-01-14T04:22:49Z"
        },
        {
            "origin": "github.com/go-yaml/yaml",
            "path": "gopkg.in/yaml.v2",
            "revision": "a5b47d31c556af34a302ce5d659e6fea44d90de0",
            "version": "v2"
        }
    ],
    "rootPath": "github.com/example/app"
}
"#;
