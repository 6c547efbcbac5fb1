use permission_core::{Generator, GeneratorConfig, PermissionTemplate, Plugin, RouteStatus};
use pretty_assertions::assert_eq;
use std::fs;

const PAYLOAD: &str = r#"{
    "Api": {
        "Service": {
            "Name": "demo",
            "Groups": [{
                "Annotation": {"Properties": {"group": "user"}},
                "Routes": [{
                    "Method": "post",
                    "Path": "/users",
                    "Handler": "createUser",
                    "AtDoc": {"Properties": {"permission": "user:create"}, "Text": ""}
                }]
            }]
        }
    },
    "ApiFilePath": "demo.api",
    "Style": "gozero",
    "Dir": ""
}"#;

const HANDLER: &str = r#"package user

import (
	"net/http"

	"demo/internal/logic/user"
	"demo/internal/svc"
	"demo/internal/types"
	"github.com/zeromicro/go-zero/rest/httpx"
)

func CreateUserHandler(svcCtx *svc.ServiceContext) http.HandlerFunc {
	return func(w http.ResponseWriter, r *http.Request) {
		var req types.CreateUserReq
		if err := httpx.Parse(r, &req); err != nil {
			httpx.ErrorCtx(r.Context(), w, err)
			return
		}

		l := user.NewCreateUserLogic(r.Context(), svcCtx)
		resp, err := l.CreateUser(&req)
		if err != nil {
			httpx.ErrorCtx(r.Context(), w, err)
		} else {
			httpx.OkJsonCtx(r.Context(), w, resp)
		}
	}
}
"#;

const EXPECTED: &str = r#"package user

import (
	"net/http"

	"demo/internal/logic/user"
	"demo/internal/svc"
	"demo/internal/types"
	"github.com/zeromicro/go-zero/rest/httpx"
	utils "github.com/sunbankio/permission/utils"
	contextkey "demo/internal/ctxkey"
)

func CreateUserHandler(svcCtx *svc.ServiceContext) http.HandlerFunc {
	return func(w http.ResponseWriter, r *http.Request) {
		var req types.CreateUserReq
		if err := httpx.Parse(r, &req); err != nil {
			httpx.ErrorCtx(r.Context(), w, err)
			return
		}
//permission:start
		if !utils.HasPermission(contextkey.FromContext(r.Context()), "user:create") {
			httpx.ErrorCtx(r.Context(), w, utils.ErrForbidden)
			return
		}
//permission:end

		l := user.NewCreateUserLogic(r.Context(), svcCtx)
		resp, err := l.CreateUser(&req)
		if err != nil {
			httpx.ErrorCtx(r.Context(), w, err)
		} else {
			httpx.OkJsonCtx(r.Context(), w, resp)
		}
	}
}
"#;

const TEMPLATE: &str = "\t\tif !utils.HasPermission(contextkey.FromContext(r.Context()), \"%s\") {\n\t\t\thttpx.ErrorCtx(r.Context(), w, utils.ErrForbidden)\n\t\t\treturn\n\t\t}";

#[test]
fn test_single_route_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let handler_dir = dir.path().join("internal/handler/user");
    fs::create_dir_all(&handler_dir).unwrap();
    let handler = handler_dir.join("createuserhandler.go");
    fs::write(&handler, HANDLER).unwrap();
    fs::write(dir.path().join("permission.tpl"), TEMPLATE).unwrap();

    let plugin = Plugin::from_reader(PAYLOAD.as_bytes()).unwrap();
    let template = PermissionTemplate::load(&dir.path().join("permission.tpl")).unwrap();

    let mut config = GeneratorConfig::new(dir.path(), "internal/handler", "demo/internal/ctxkey");
    config.dump_dir = Some("dump".into());
    let generator = Generator::new(config, template);

    let report = generator.run(&plugin.api.service);
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].status, RouteStatus::Patched);
    assert_eq!(fs::read_to_string(&handler).unwrap(), EXPECTED);

    let dump = generator.dump_ledger(&report).unwrap().unwrap();
    assert_eq!(fs::read_to_string(dump).unwrap(), r#"["user:create"]"#);

    // A second run is a no-op.
    generator.run(&plugin.api.service);
    assert_eq!(fs::read_to_string(&handler).unwrap(), EXPECTED);
}

#[test]
fn test_dump_only_leaves_sources_alone() {
    let dir = tempfile::tempdir().unwrap();
    let handler_dir = dir.path().join("internal/handler/user");
    fs::create_dir_all(&handler_dir).unwrap();
    let handler = handler_dir.join("createuserhandler.go");
    fs::write(&handler, HANDLER).unwrap();

    let plugin = Plugin::from_reader(PAYLOAD.as_bytes()).unwrap();
    let mut config = GeneratorConfig::new(dir.path(), "internal/handler", "demo/internal/ctxkey");
    config.dump_only = true;
    let generator = Generator::new(config, PermissionTemplate::parse("check(%q)").unwrap());

    let report = generator.run(&plugin.api.service);
    assert_eq!(report.ledger.permissions(), &["user:create".to_string()]);
    assert_eq!(report.outcomes[0].status, RouteStatus::Skipped);
    assert_eq!(fs::read_to_string(&handler).unwrap(), HANDLER);
}
