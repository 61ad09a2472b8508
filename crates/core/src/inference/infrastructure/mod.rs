pub mod grpc_prediction_client;
mod serving_proto;
