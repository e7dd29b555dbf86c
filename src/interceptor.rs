mod batch_methods;
mod batch_state;
mod hook_point_set;
mod intercepted_data;
mod interception_hook_point;
mod interceptor_trait;
mod rpc_info;
mod rpc_method_type;

pub use batch_methods::InterceptorBatchMethods;
pub use batch_state::{ChainOutcome, InterceptorBatchState};
pub use hook_point_set::HookPointSet;
pub use intercepted_data::InterceptedData;
pub use interception_hook_point::InterceptionHookPoint;
pub use interceptor_trait::{Interceptor, interceptor_fn};
pub use rpc_info::{ClientRpcInfo, RpcInfo, ServerRpcInfo, method_id_hash};
pub use rpc_method_type::RpcMethodType;
